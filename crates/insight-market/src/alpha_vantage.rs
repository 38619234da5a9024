//! Alpha Vantage API client
//!
//! Supplies what the price feed cannot: valuation fundamentals (OVERVIEW)
//! and quarterly income statements (INCOME_STATEMENT). All numeric fields
//! arrive as strings; unparseable values ("None", "-", empty) map to
//! unknown rather than zero.

use crate::error::{MarketError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use insight_core::{FinancialStatements, FundamentalsSnapshot, QuarterlyIncome};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Descriptive company information for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,
    pub market_cap: Option<f64>,
}

/// Raw OVERVIEW payload; numeric fields are strings on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOverview {
    symbol: String,
    name: Option<String>,
    exchange: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    currency: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    forward_pe: Option<String>,
    #[serde(rename = "PriceToBookRatio")]
    price_to_book: Option<String>,
}

/// Raw quarterly income statement row
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIncomeReport {
    fiscal_date_ending: String,
    total_revenue: Option<String>,
    net_income: Option<String>,
    gross_profit: Option<String>,
    operating_income: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIncomeStatement {
    #[serde(default)]
    quarterly_reports: Vec<RawIncomeReport>,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (free tier: 5)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).expect("nonzero")));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with the
    /// free-tier rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            MarketError::ConfigError("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, 5))
    }

    /// Fetch valuation fundamentals and the company profile
    pub async fn get_company_overview(
        &self,
        symbol: &str,
    ) -> Result<(FundamentalsSnapshot, CompanyProfile)> {
        let data = self.query("OVERVIEW", symbol).await?;

        // Empty object means the symbol is unknown
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(MarketError::InvalidSymbol(symbol.to_string()));
        }

        let overview: RawOverview = serde_json::from_value(data)?;
        Ok(split_overview(overview))
    }

    /// Fetch quarterly income statements, most recent first
    pub async fn get_income_statement(&self, symbol: &str) -> Result<FinancialStatements> {
        let data = self.query("INCOME_STATEMENT", symbol).await?;
        let statement: RawIncomeStatement = serde_json::from_value(data)?;

        Ok(FinancialStatements {
            income_quarterly: statement
                .quarterly_reports
                .into_iter()
                .map(|row| QuarterlyIncome {
                    period: row.fiscal_date_ending,
                    total_revenue: parse_metric(row.total_revenue.as_deref()),
                    net_income: parse_metric(row.net_income.as_deref()),
                    gross_profit: parse_metric(row.gross_profit.as_deref()),
                    operating_income: parse_metric(row.operating_income.as_deref()),
                })
                .collect(),
        })
    }

    /// Issue one rate-limited query and surface the API's in-band errors
    async fn query(&self, function: &str, symbol: &str) -> Result<serde_json::Value> {
        // Wait for the rate limiter
        self.rate_limiter.until_ready().await;

        let mut params = HashMap::new();
        params.insert("function", function);
        params.insert("symbol", symbol);
        params.insert("apikey", &self.api_key);

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::AlphaVantage(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(MarketError::AlphaVantage(error.to_string()));
        }

        // "Note" and "Information" both signal throttling on the free tier
        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(MarketError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        Ok(data)
    }
}

fn split_overview(overview: RawOverview) -> (FundamentalsSnapshot, CompanyProfile) {
    let fundamentals = FundamentalsSnapshot {
        trailing_pe: parse_metric(overview.pe_ratio.as_deref()),
        forward_pe: parse_metric(overview.forward_pe.as_deref()),
        price_to_book: parse_metric(overview.price_to_book.as_deref()),
    };

    let profile = CompanyProfile {
        symbol: overview.symbol,
        name: overview.name,
        exchange: overview.exchange,
        sector: overview.sector,
        industry: overview.industry,
        currency: overview.currency,
        market_cap: parse_metric(overview.market_cap.as_deref()),
    };

    (fundamentals, profile)
}

/// Parse an Alpha Vantage numeric field
///
/// The API reports unknown values as "None", "-", or an empty string.
fn parse_metric(value: Option<&str>) -> Option<f64> {
    let v = value?.trim();
    if v.is_empty() || v == "None" || v == "-" {
        return None;
    }
    v.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key", 5);
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric(Some("28.4")), Some(28.4));
        assert_eq!(parse_metric(Some("None")), None);
        assert_eq!(parse_metric(Some("-")), None);
        assert_eq!(parse_metric(Some("")), None);
        assert_eq!(parse_metric(Some("not a number")), None);
        assert_eq!(parse_metric(None), None);
    }

    #[test]
    fn test_split_overview() {
        let raw: RawOverview = serde_json::from_value(json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Exchange": "NASDAQ",
            "Sector": "TECHNOLOGY",
            "Industry": "ELECTRONIC COMPUTERS",
            "Currency": "USD",
            "MarketCapitalization": "3000000000000",
            "PERatio": "29.1",
            "ForwardPE": "None",
            "PriceToBookRatio": "45.2"
        }))
        .expect("parses");

        let (fundamentals, profile) = split_overview(raw);
        assert_eq!(fundamentals.trailing_pe, Some(29.1));
        assert_eq!(fundamentals.forward_pe, None);
        assert_eq!(fundamentals.price_to_book, Some(45.2));
        assert_eq!(profile.name.as_deref(), Some("Apple Inc"));
        assert_eq!(profile.market_cap, Some(3.0e12));
    }

    #[test]
    fn test_income_statement_rows_parse() {
        let raw: RawIncomeStatement = serde_json::from_value(json!({
            "symbol": "AAPL",
            "quarterlyReports": [
                {
                    "fiscalDateEnding": "2024-06-30",
                    "totalRevenue": "85777000000",
                    "netIncome": "21448000000",
                    "grossProfit": "39678000000",
                    "operatingIncome": "25352000000"
                },
                {
                    "fiscalDateEnding": "2024-03-31",
                    "totalRevenue": "None",
                    "netIncome": "23636000000"
                }
            ]
        }))
        .expect("parses");

        assert_eq!(raw.quarterly_reports.len(), 2);
        assert_eq!(raw.quarterly_reports[0].fiscal_date_ending, "2024-06-30");
        assert_eq!(
            parse_metric(raw.quarterly_reports[1].total_revenue.as_deref()),
            None
        );
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_get_company_overview() {
        let client = AlphaVantageClient::from_env().expect("key set");
        let (fundamentals, profile) = client
            .get_company_overview("AAPL")
            .await
            .expect("overview fetch");

        assert_eq!(profile.symbol, "AAPL");
        assert!(fundamentals.trailing_pe.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_get_income_statement() {
        let client = AlphaVantageClient::from_env().expect("key set");
        let statements = client
            .get_income_statement("AAPL")
            .await
            .expect("statement fetch");
        assert!(!statements.is_empty());
    }
}
