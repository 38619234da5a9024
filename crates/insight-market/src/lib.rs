//! Market data retrieval for insight-rs
//!
//! Two upstream providers, split the way their capabilities fall:
//!
//! - Yahoo Finance for price history and intraday quotes (no key required)
//! - Alpha Vantage for fundamentals and quarterly income statements
//!   (optional API key; without one those fields stay unknown)
//!
//! [`MarketDataService`] is the entry point: it owns both clients, a
//! TTL cache per data tier, and retry-with-backoff for transient failures.

pub mod alpha_vantage;
pub mod cache;
pub mod config;
pub mod error;
pub mod period;
pub mod service;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyProfile};
pub use cache::{CacheKey, CacheManager, MarketCache};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use period::Period;
pub use service::{MarketDataService, StockSnapshot};
pub use yahoo::{MoveSource, PriceMove, YahooFinanceClient};
