//! Error types for the analysis layer

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while producing commentary
///
/// Recoverable LLM failures never surface here; the analyzer substitutes
/// its rule-based fallback for those. What remains is caller-visible:
/// broken prompts, unserializable payloads, and non-recoverable LLM errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Non-recoverable LLM failure (invalid request, configuration, ...)
    #[error("LLM error: {0}")]
    Llm(#[from] insight_llm::LLMError),

    /// Prompt template failed to build or render
    #[error("Prompt error: {0}")]
    Prompt(#[from] insight_prompt::PromptError),

    /// Indicator or statement payload failed to serialize
    #[error("Payload serialization error: {0}")]
    Payload(#[from] serde_json::Error),
}
