//! MiniJinja-backed bilingual templates
//!
//! Template syntax is standard Jinja2: `{{ variable }}`, filters,
//! conditionals. Variables are passed as `serde_json::Value`.

use crate::{Language, PromptError, Result};
use minijinja::Environment;
use std::collections::HashMap;

/// A named prompt template with one body per language
///
/// # Examples
///
/// ```
/// use insight_prompt::{JinjaTemplate, Language};
/// use serde_json::json;
///
/// let template = JinjaTemplate::bilingual(
///     "greeting",
///     "你好，{{ name }}！",
///     "Hello, {{ name }}!",
/// ).unwrap();
///
/// let rendered = template.render(Language::English, &json!({ "name": "World" })).unwrap();
/// assert_eq!(rendered, "Hello, World!");
/// ```
pub struct JinjaTemplate {
    name: String,
    bodies: HashMap<Language, String>,
}

impl JinjaTemplate {
    /// Create a single-language template
    pub fn new(name: impl Into<String>, language: Language, body: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut bodies = HashMap::new();
        bodies.insert(language, body.into());
        Self::validated(name, bodies)
    }

    /// Create a template with Traditional Chinese and English bodies
    pub fn bilingual(
        name: impl Into<String>,
        chinese: impl Into<String>,
        english: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let mut bodies = HashMap::new();
        bodies.insert(Language::Chinese, chinese.into());
        bodies.insert(Language::English, english.into());
        Self::validated(name, bodies)
    }

    /// Check every body parses before handing the template out
    fn validated(name: String, bodies: HashMap<Language, String>) -> Result<Self> {
        if bodies.is_empty() {
            return Err(PromptError::NoLanguageAvailable(name));
        }
        for body in bodies.values() {
            let mut env = Environment::new();
            env.add_template(&name, body)
                .map_err(|e| PromptError::RenderFailed {
                    name: name.clone(),
                    detail: e.to_string(),
                })?;
        }
        Ok(Self { name, bodies })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Languages this template can render in
    pub fn languages(&self) -> Vec<Language> {
        self.bodies.keys().copied().collect()
    }

    /// Whether a language is available
    pub fn supports(&self, language: Language) -> bool {
        self.bodies.contains_key(&language)
    }

    /// Render for a language, erroring when the language is missing
    pub fn render(&self, language: Language, vars: &serde_json::Value) -> Result<String> {
        let body = self
            .bodies
            .get(&language)
            .ok_or_else(|| PromptError::LanguageNotAvailable {
                name: self.name.clone(),
                language: language.code().to_string(),
            })?;

        // A fresh environment per render keeps the template free of
        // borrowed lifetimes
        let mut env = Environment::new();
        env.add_template(&self.name, body)
            .map_err(|e| PromptError::RenderFailed {
                name: self.name.clone(),
                detail: e.to_string(),
            })?;
        let template = env
            .get_template(&self.name)
            .map_err(|e| PromptError::RenderFailed {
                name: self.name.clone(),
                detail: e.to_string(),
            })?;
        template
            .render(vars)
            .map_err(|e| PromptError::RenderFailed {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    /// Render for a language, falling back to any available body when the
    /// requested language is missing
    pub fn render_with_fallback(
        &self,
        language: Language,
        vars: &serde_json::Value,
    ) -> Result<String> {
        if self.supports(language) {
            return self.render(language, vars);
        }
        let fallback = self
            .languages()
            .into_iter()
            .next()
            .ok_or_else(|| PromptError::NoLanguageAvailable(self.name.clone()))?;
        self.render(fallback, vars)
    }
}
