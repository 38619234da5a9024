//! Core domain model for stock analysis
//!
//! This crate holds the pure, I/O-free heart of the system:
//!
//! - Price history and fundamentals types ([`PriceSeries`], [`Bar`],
//!   [`FundamentalsSnapshot`], [`FinancialStatements`])
//! - The indicator engine ([`compute_indicators`]) deriving valuation and
//!   momentum metrics from a price series and a fundamentals snapshot
//! - The question guard ([`review_question`]) classifying free-text user
//!   questions before they reach a generative model
//!
//! Both the indicator engine and the guard are synchronous pure functions
//! with a "best effort, never fail" contract: missing preconditions degrade
//! individual fields to `None` instead of raising errors, so callers never
//! have to unwind on short or partial data.

pub mod fundamentals;
pub mod guard;
pub mod indicators;
pub mod series;
pub mod text;

pub use fundamentals::{FinancialStatements, FundamentalsSnapshot, QuarterlyIncome};
pub use guard::{GuardLevel, GuardReason, GuardVerdict, review_question};
pub use indicators::{
    IndicatorResult, Momentum, TradingDaySnapshot, Valuation, compute_indicators,
    trading_day_snapshot,
};
pub use series::{Bar, PriceSeries};
pub use text::clean_text;
