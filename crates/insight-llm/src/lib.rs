//! LLM provider abstraction for insight-rs
//!
//! Provider-agnostic types for text completion:
//!
//! - Message and role types for chat-shaped requests
//! - Completion request/response types with a builder
//! - The [`LLMProvider`] trait implemented by concrete backends
//! - A Google Gemini provider behind the `gemini` feature flag
//!
//! The error type enumerates failure kinds (auth, rate limit, transport,
//! empty response, ...) so callers can decide per kind whether to fall back
//! to a canned response or to propagate.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
