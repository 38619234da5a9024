//! AI commentary for insight-rs
//!
//! Turns computed indicators and financial statements into narrative
//! analysis. When a language model is configured the narrative comes from
//! Gemini through [`insight_llm::LLMProvider`]; without one, or when the
//! call fails in a recoverable way (transport, auth, rate limit, empty
//! generation), a deterministic rule-based template takes its place. A
//! malformed request is a bug and propagates instead.

pub mod analyzer;
pub mod error;
pub mod fallback;
pub mod prompts;

pub use analyzer::{AiAnalyzer, TranslatedParagraph, transcript_mentions_company};
pub use error::{AnalysisError, Result};
