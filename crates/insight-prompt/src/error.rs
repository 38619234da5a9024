//! Error types for prompt templating

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur while building or rendering a template
#[derive(Error, Debug)]
pub enum PromptError {
    /// The template has no content for the requested language
    #[error("Template '{name}' has no content for language '{language}'")]
    LanguageNotAvailable { name: String, language: String },

    /// The template was built with no languages at all
    #[error("Template '{0}' has no languages")]
    NoLanguageAvailable(String),

    /// MiniJinja failed to parse or render the template
    #[error("Template '{name}' failed to render: {detail}")]
    RenderFailed { name: String, detail: String },
}
