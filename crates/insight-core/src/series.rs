//! Price history types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One time-bucketed price observation
///
/// Close is always present; open/high/low and volume vary by instrument
/// (some indices and OTC listings report close-only bars). Absent columns
/// mean "unknown", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Observation timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Opening price, if reported
    pub open: Option<f64>,
    /// Session high, if reported
    pub high: Option<f64>,
    /// Session low, if reported
    pub low: Option<f64>,
    /// Closing price
    pub close: f64,
    /// Traded volume, if reported
    pub volume: Option<u64>,
}

impl Bar {
    /// Create a close-only bar
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// Attach open/high/low columns
    pub fn with_ohlc(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    /// Attach a volume column
    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// An ordered daily or intraday price history
///
/// Bars are kept in chronological order with no duplicate timestamps; the
/// constructor enforces both. The series is immutable once built - the
/// indicator engine only reads it and returns freshly derived values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars in any order
    ///
    /// Bars are sorted chronologically; on duplicate timestamps the last
    /// observation wins.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by(|later, kept| {
            if later.timestamp == kept.timestamp {
                *kept = later.clone();
                true
            } else {
                false
            }
        });
        Self { bars }
    }

    /// An empty series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series holds no bars
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars, oldest first
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The most recent bar
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close of the most recent bar
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Closing prices, oldest first
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Distinct calendar years covered by the series
    pub fn years(&self) -> BTreeSet<i32> {
        self.bars.iter().map(|b| b.timestamp.year()).collect()
    }
}
