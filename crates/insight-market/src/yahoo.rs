//! Yahoo Finance API client

use crate::error::{MarketError, Result};
use crate::period::Period;
use chrono::{DateTime, Utc};
use insight_core::{Bar, PriceSeries};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// How a recent price move was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    /// One-minute bars from the last trading hour
    Intraday,
    /// Last daily close compared to the previous close
    LastClose,
}

/// Recent price movement summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMove {
    pub last: f64,
    pub change: f64,
    pub pct: f64,
    pub source: MoveSource,
}

/// Yahoo Finance API client
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Fetch daily price history covering the given period
    pub async fn get_history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(period.days());
        self.get_history_between(symbol, start, end).await
    }

    /// Fetch daily price history between two instants
    pub async fn get_history_between(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = connector()?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        Ok(PriceSeries::new(quotes.iter().map(quote_to_bar).collect()))
    }

    /// Recent price movement: last trading hour when one-minute bars are
    /// available, otherwise last close vs. previous close
    ///
    /// Returns `Ok(None)` when neither intraday nor daily data exists for
    /// the symbol.
    pub async fn recent_price_move(&self, symbol: &str) -> Result<Option<PriceMove>> {
        // Intraday first; thinly traded symbols often have no minute bars,
        // which falls through to the daily path
        match self.intraday_move(symbol).await {
            Ok(Some(mv)) => return Ok(Some(mv)),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(symbol, error = %e, "intraday quotes unavailable");
            }
        }

        self.last_close_move(symbol).await
    }

    async fn intraday_move(&self, symbol: &str) -> Result<Option<PriceMove>> {
        let provider = connector()?;
        let response = provider
            .get_quote_range(symbol, "1m", "1d")
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;
        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        if quotes.is_empty() {
            return Ok(None);
        }

        // The last hour of one-minute bars, or whatever is available
        let window = &quotes[quotes.len().saturating_sub(60)..];
        let first = window[0].close;
        let last = window[window.len() - 1].close;
        let pct = if first == 0.0 { 0.0 } else { (last - first) / first };

        Ok(Some(PriceMove {
            last,
            change: last - first,
            pct,
            source: MoveSource::Intraday,
        }))
    }

    async fn last_close_move(&self, symbol: &str) -> Result<Option<PriceMove>> {
        let provider = connector()?;
        let response = provider
            .get_quote_range(symbol, "1d", "5d")
            .await
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;
        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinance(e.to_string()))?;

        if quotes.is_empty() {
            return Ok(None);
        }

        let last_close = quotes[quotes.len() - 1].close;
        let prev_close = if quotes.len() >= 2 {
            quotes[quotes.len() - 2].close
        } else {
            last_close
        };
        let change = last_close - prev_close;
        let pct = if prev_close == 0.0 {
            0.0
        } else {
            change / prev_close
        };

        Ok(Some(PriceMove {
            last: last_close,
            change,
            pct,
            source: MoveSource::LastClose,
        }))
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for YahooFinanceClient {
    fn clone(&self) -> Self {
        Self::new()
    }
}

fn connector() -> Result<yahoo::YahooConnector> {
    yahoo::YahooConnector::new().map_err(|e| MarketError::YahooFinance(e.to_string()))
}

fn quote_to_bar(quote: &yahoo::Quote) -> Bar {
    Bar::new(
        DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
        quote.close,
    )
    .with_ohlc(quote.open, quote.high, quote.low)
    .with_volume(quote.volume)
}
