//! Language selection for prompts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages a prompt can be rendered in
///
/// The product speaks Traditional Chinese first; English is the secondary
/// rendering used when a caller asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Traditional Chinese
    #[default]
    Chinese,
    /// English
    English,
}

impl Language {
    /// Language code used on the command line and in configuration
    pub fn code(&self) -> &'static str {
        match self {
            Language::Chinese => "zh",
            Language::English => "en",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Chinese => "Chinese",
            Language::English => "English",
        }
    }

    /// Parse from a code or common name; unknown input falls back to the
    /// default language
    pub fn from_code(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "en" | "english" => Language::English,
            _ => Language::Chinese,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::from_code(s)
    }
}
