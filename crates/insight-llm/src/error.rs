//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
///
/// Variants are deliberately fine-grained: the analysis layer substitutes a
/// rule-based template only for the kinds listed by
/// [`LLMError::is_recoverable`] and propagates the rest.
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The provider returned no usable text
    #[error("Empty response from provider")]
    EmptyResponse,

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether a caller holding a canned fallback should use it
    ///
    /// Transport problems, provider-side refusals (auth, rate limit, missing
    /// model), and empty generations are recoverable by substitution; a
    /// malformed request or configuration is a caller bug and is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::AuthenticationFailed
            | Self::RateLimitExceeded(_)
            | Self::ModelNotFound(_)
            | Self::EmptyResponse
            | Self::UnexpectedResponse(_) => true,
            #[cfg(feature = "gemini")]
            Self::HttpError(_) => true,
            Self::InvalidRequest(_) | Self::SerializationError(_) | Self::ConfigurationError(_) => {
                false
            }
        }
    }
}
