//! Market data orchestration
//!
//! Ties the two upstream clients together behind one call surface, with
//! per-tier caching and retry-with-backoff for transient failures. Price
//! history is load-bearing and errors propagate; fundamentals and
//! statements degrade to "unknown" when their provider is missing or
//! failing, matching the engine's null-degradation contract.

use crate::alpha_vantage::{AlphaVantageClient, CompanyProfile};
use crate::cache::{CacheKey, CacheManager};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::period::Period;
use crate::yahoo::{PriceMove, YahooFinanceClient};
use insight_core::{FinancialStatements, FundamentalsSnapshot, PriceSeries};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Everything fetched for one analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub series: PriceSeries,
    pub fundamentals: FundamentalsSnapshot,
    pub profile: Option<CompanyProfile>,
}

/// Market data service combining Yahoo Finance and Alpha Vantage
pub struct MarketDataService {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
    cache: CacheManager,
    config: Arc<MarketConfig>,
}

impl MarketDataService {
    /// Create a service from configuration
    ///
    /// The Alpha Vantage client exists only when the config carries a key;
    /// without it fundamentals and statements stay unknown.
    pub fn new(config: Arc<MarketConfig>) -> Self {
        let alpha_vantage = config
            .alpha_vantage_api_key
            .as_ref()
            .map(|key| AlphaVantageClient::new(key.clone(), config.alpha_vantage_rate_limit));

        Self {
            yahoo: YahooFinanceClient::new(),
            alpha_vantage,
            cache: CacheManager::new(config.cache_ttl_quotes, config.cache_ttl_fundamentals),
            config,
        }
    }

    /// Whether a fundamentals provider is configured
    pub fn has_fundamentals_provider(&self) -> bool {
        self.alpha_vantage.is_some()
    }

    /// Fetch price history, fundamentals, and the company profile
    ///
    /// Price history failures propagate; fundamentals failures are logged
    /// and degrade to an empty snapshot.
    pub async fn fetch_stock(&self, symbol: &str, period: Period) -> Result<StockSnapshot> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(MarketError::InvalidSymbol(symbol));
        }

        let series = self.fetch_history(&symbol, period).await?;
        if series.is_empty() {
            return Err(MarketError::DataUnavailable {
                symbol,
                reason: "No price history returned".to_string(),
            });
        }

        let (fundamentals, profile) = match &self.alpha_vantage {
            Some(client) => match self.fetch_overview(client, &symbol).await {
                Ok((fundamentals, profile)) => (fundamentals, Some(profile)),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "fundamentals unavailable, continuing without");
                    (FundamentalsSnapshot::default(), None)
                }
            },
            None => (FundamentalsSnapshot::default(), None),
        };

        Ok(StockSnapshot {
            symbol,
            series,
            fundamentals,
            profile,
        })
    }

    /// Fetch quarterly financial statements
    ///
    /// Degrades to empty statements when no provider is configured or the
    /// fetch fails; the guard and the earnings view treat emptiness as
    /// "no data", not as an error.
    pub async fn fetch_financials(&self, symbol: &str) -> FinancialStatements {
        let symbol = symbol.trim().to_uppercase();
        let Some(client) = &self.alpha_vantage else {
            return FinancialStatements::default();
        };

        let key = CacheKey::new(&symbol, "income_statement", serde_json::json!({}));
        let fetched = self
            .cache
            .fundamentals
            .get_or_fetch(key, || async {
                let statements = client.get_income_statement(&symbol).await?;
                Ok::<_, MarketError>(serde_json::to_value(statements)?)
            })
            .await;

        match fetched.and_then(|value| Ok(serde_json::from_value(value)?)) {
            Ok(statements) => statements,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "financial statements unavailable");
                FinancialStatements::default()
            }
        }
    }

    /// Recent price movement for the symbol (intraday or last close)
    pub async fn recent_price_move(&self, symbol: &str) -> Result<Option<PriceMove>> {
        let symbol = symbol.trim().to_uppercase();
        self.yahoo.recent_price_move(&symbol).await
    }

    async fn fetch_history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let key = CacheKey::new(symbol, "history", serde_json::json!({"period": period}));
        let value = self
            .cache
            .quotes
            .get_or_fetch(key, || async {
                let series = self
                    .with_retry("price history", || self.yahoo.get_history(symbol, period))
                    .await?;
                Ok::<_, MarketError>(serde_json::to_value(series)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_overview(
        &self,
        client: &AlphaVantageClient,
        symbol: &str,
    ) -> Result<(FundamentalsSnapshot, CompanyProfile)> {
        let key = CacheKey::new(symbol, "overview", serde_json::json!({}));
        let value = self
            .cache
            .fundamentals
            .get_or_fetch(key, || async {
                let overview = client.get_company_overview(symbol).await?;
                Ok::<_, MarketError>(serde_json::to_value(overview)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Run an operation, retrying transient failures with exponential
    /// backoff up to the configured attempt count
    async fn with_retry<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(what, attempt, error = %e, "transient failure, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_without_key() -> MarketDataService {
        MarketDataService::new(Arc::new(MarketConfig::default()))
    }

    #[test]
    fn test_no_fundamentals_provider_without_key() {
        let service = service_without_key();
        assert!(!service.has_fundamentals_provider());
    }

    #[test]
    fn test_provider_present_with_key() {
        let config = MarketConfig::builder()
            .alpha_vantage_api_key("test_key")
            .build()
            .expect("valid config");
        let service = MarketDataService::new(Arc::new(config));
        assert!(service.has_fundamentals_provider());
    }

    #[tokio::test]
    async fn test_fetch_financials_without_provider_is_empty() {
        let service = service_without_key();
        let statements = service.fetch_financials("AAPL").await;
        assert!(statements.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_stock_rejects_blank_symbol() {
        let service = service_without_key();
        let result = service.fetch_stock("   ", Period::ThreeMonths).await;
        assert!(matches!(result, Err(MarketError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_stock() {
        let service = service_without_key();
        let snapshot = service
            .fetch_stock("aapl", Period::ThreeMonths)
            .await
            .expect("fetch succeeds");

        assert_eq!(snapshot.symbol, "AAPL");
        assert!(!snapshot.series.is_empty());
        // No Alpha Vantage key: fundamentals stay unknown
        assert_eq!(snapshot.fundamentals, FundamentalsSnapshot::default());
    }
}
