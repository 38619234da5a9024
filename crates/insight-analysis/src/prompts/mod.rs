//! Prompt templates for the analysis layer
//!
//! Every prompt ships in Traditional Chinese and English; the analyzer
//! renders whichever language it was configured with.

pub mod system;
pub mod user;

pub use system::{advisor, earnings_analyst, transcript_analyst, translator};
pub use user::{analysis_request, earnings_request};
