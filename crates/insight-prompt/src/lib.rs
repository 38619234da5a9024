//! Bilingual prompt templating for insight-rs
//!
//! The analysis prompts ship in Traditional Chinese (the product's primary
//! audience) and English. Each prompt is a [`JinjaTemplate`] holding one
//! MiniJinja template per [`Language`]; rendering picks the requested
//! language and falls back to the first available one when it is missing.

pub mod error;
pub mod language;
pub mod template;

pub use error::{PromptError, Result};
pub use language::Language;
pub use template::JinjaTemplate;
