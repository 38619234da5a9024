//! Indicator engine
//!
//! Derives valuation and momentum metrics from a price series and a
//! fundamentals snapshot. Every metric degrades to `None` on its own when
//! its precondition (enough bars, column present, metric reported) is not
//! met; the engine itself never fails and never mutates its inputs.

use crate::fundamentals::FundamentalsSnapshot;
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{RelativeStrengthIndex, SimpleMovingAverage};

/// Lookback for the one-month return: ~22 trading days per month.
/// A fixed convention, not configurable.
pub const ONE_MONTH_BARS: usize = 22;

/// Lookback for the three-month return and high/low window: ~66 trading days.
pub const THREE_MONTH_BARS: usize = 66;

/// Valuation metrics, passed through from fundamentals plus the last close
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    #[serde(rename = "latestPrice")]
    pub latest_price: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "priceToBook")]
    pub price_to_book: Option<f64>,
}

/// Momentum metrics derived from the price series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Momentum {
    pub one_month_return: Option<f64>,
    pub three_month_return: Option<f64>,
    /// Sample standard deviation of close-to-close percentage change over
    /// the whole supplied series (the caller's period selection is the
    /// window), not a fixed 66-bar lookback.
    #[serde(rename = "volatility3m")]
    pub volatility_3m: Option<f64>,
    #[serde(rename = "high3m")]
    pub high_3m: Option<f64>,
    #[serde(rename = "low3m")]
    pub low_3m: Option<f64>,
}

/// Combined indicator output for one analysis request
///
/// Serialized field names match the JSON payload handed to the language
/// model (`latestPrice`, `oneMonthReturn`, ...), so the struct can be fed
/// to a prompt without an intermediate mapping step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub valuation: Valuation,
    pub momentum: Momentum,
}

/// Compute valuation and momentum indicators
///
/// Pure and deterministic: identical inputs always produce identical
/// results, and the inputs are never modified.
pub fn compute_indicators(
    series: &PriceSeries,
    fundamentals: &FundamentalsSnapshot,
) -> IndicatorResult {
    let closes = series.closes();
    let len = closes.len();
    let latest_price = series.last_close();

    let one_month_return = lookback_return(&closes, ONE_MONTH_BARS);
    let three_month_return = lookback_return(&closes, THREE_MONTH_BARS);

    let window = &series.bars()[len.saturating_sub(THREE_MONTH_BARS)..];
    let high_3m = fold_extreme(window.iter().filter_map(|b| b.high), f64::max);
    let low_3m = fold_extreme(window.iter().filter_map(|b| b.low), f64::min);

    let volatility_3m = if len > 2 {
        let pct_changes: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        sample_std(&pct_changes)
    } else {
        None
    };

    IndicatorResult {
        valuation: Valuation {
            latest_price,
            trailing_pe: fundamentals.trailing_pe,
            forward_pe: fundamentals.forward_pe,
            price_to_book: fundamentals.price_to_book,
        },
        momentum: Momentum {
            one_month_return,
            three_month_return,
            volatility_3m,
            high_3m,
            low_3m,
        },
    }
}

/// `close[-1] / close[-bars] - 1`, requiring at least `bars` observations
fn lookback_return(closes: &[f64], bars: usize) -> Option<f64> {
    let len = closes.len();
    if len < bars {
        return None;
    }
    let latest = closes[len - 1];
    let base = closes[len - bars];
    Some(latest / base - 1.0)
}

/// Reduce to a max/min, `None` when the iterator is empty
fn fold_extreme(values: impl Iterator<Item = f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a| pick(a, v))))
}

/// Sample standard deviation (n - 1 denominator)
fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Most-recent-trading-day summary: moving averages, volume, RSI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingDaySnapshot {
    /// Date label of the last bar (`YYYY-MM-DD`)
    pub date: Option<String>,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub volume: Option<u64>,
    pub rsi14: Option<f64>,
}

/// Summarize the most recent trading day of a series
///
/// Moving averages require at least `window` bars; RSI(14) requires more
/// than 15 bars. Short series degrade each field to `None`.
pub fn trading_day_snapshot(series: &PriceSeries) -> TradingDaySnapshot {
    let closes = series.closes();

    TradingDaySnapshot {
        date: series
            .last()
            .map(|b| b.timestamp.format("%Y-%m-%d").to_string()),
        ma5: last_sma(&closes, 5),
        ma10: last_sma(&closes, 10),
        ma20: last_sma(&closes, 20),
        volume: series.last().and_then(|b| b.volume),
        rsi14: last_rsi(&closes, 14),
    }
}

/// Last value of a simple moving average over `closes`
fn last_sma(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    let mut last = None;
    for &close in closes {
        last = Some(sma.next(close));
    }
    last
}

/// Last RSI value; needs more than `period + 1` bars to be meaningful
fn last_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() <= period + 1 {
        return None;
    }
    let mut rsi = RelativeStrengthIndex::new(period).ok()?;
    let mut last = None;
    for &close in closes {
        last = Some(rsi.next(close));
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;
    use chrono::{Duration, TimeZone, Utc};

    /// Daily close-only series starting 2024-01-02
    fn close_series(closes: &[f64]) -> PriceSeries {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
            .single()
            .expect("valid date");
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c))
                .collect(),
        )
    }

    fn ohlc_series(rows: &[(f64, f64, f64)]) -> PriceSeries {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
            .single()
            .expect("valid date");
        PriceSeries::new(
            rows.iter()
                .enumerate()
                .map(|(i, &(high, low, close))| {
                    Bar::new(start + Duration::days(i as i64), close).with_ohlc(close, high, low)
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_series_all_null() {
        let result = compute_indicators(&PriceSeries::empty(), &FundamentalsSnapshot::default());

        assert_eq!(result.valuation.latest_price, None);
        assert_eq!(result.momentum.one_month_return, None);
        assert_eq!(result.momentum.three_month_return, None);
        assert_eq!(result.momentum.volatility_3m, None);
        assert_eq!(result.momentum.high_3m, None);
        assert_eq!(result.momentum.low_3m, None);
    }

    #[test]
    fn test_one_month_return_requires_22_bars() {
        let short = close_series(&vec![100.0; 21]);
        let result = compute_indicators(&short, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.one_month_return, None);

        let mut closes = vec![100.0; 22];
        closes[0] = 80.0; // close[-22] with exactly 22 bars
        closes[21] = 88.0;
        let exact = close_series(&closes);
        let result = compute_indicators(&exact, &FundamentalsSnapshot::default());
        let one_month = result.momentum.one_month_return.expect("22 bars present");
        assert!((one_month - (88.0 / 80.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_three_month_return_requires_66_bars() {
        let short = close_series(&vec![100.0; 65]);
        let result = compute_indicators(&short, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.three_month_return, None);

        let mut closes = vec![100.0; 66];
        closes[0] = 50.0;
        closes[65] = 60.0;
        let exact = close_series(&closes);
        let result = compute_indicators(&exact, &FundamentalsSnapshot::default());
        let three_month = result.momentum.three_month_return.expect("66 bars present");
        assert!((three_month - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_high_low_over_last_66_bars() {
        // 70 bars; the first 4 carry an extreme that must be ignored
        let mut rows = vec![(500.0, 1.0, 100.0); 4];
        rows.extend(vec![(110.0, 90.0, 100.0); 65]);
        rows.push((120.0, 85.0, 100.0));
        let series = ohlc_series(&rows);

        let result = compute_indicators(&series, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.high_3m, Some(120.0));
        assert_eq!(result.momentum.low_3m, Some(85.0));
    }

    #[test]
    fn test_high_low_null_without_columns() {
        let series = close_series(&[100.0, 101.0, 102.0, 103.0]);
        let result = compute_indicators(&series, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.high_3m, None);
        assert_eq!(result.momentum.low_3m, None);
    }

    #[test]
    fn test_high_low_shorter_than_window_uses_all_bars() {
        let series = ohlc_series(&[(105.0, 95.0, 100.0), (108.0, 97.0, 101.0)]);
        let result = compute_indicators(&series, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.high_3m, Some(108.0));
        assert_eq!(result.momentum.low_3m, Some(95.0));
    }

    #[test]
    fn test_volatility_requires_more_than_two_bars() {
        let two = close_series(&[100.0, 101.0]);
        let result = compute_indicators(&two, &FundamentalsSnapshot::default());
        assert_eq!(result.momentum.volatility_3m, None);

        // closes 100, 110, 99: pct changes 0.1 and -0.1, sample std of
        // {0.1, -0.1} = sqrt(0.02) ~= 0.14142
        let three = close_series(&[100.0, 110.0, 99.0]);
        let result = compute_indicators(&three, &FundamentalsSnapshot::default());
        let vol = result.momentum.volatility_3m.expect("3 bars present");
        assert!((vol - (0.02f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_uses_whole_series() {
        // 100 flat bars then a jump: a 66-bar window would see only the
        // flat tail after the jump, the whole-series std must not
        let mut closes = vec![100.0; 100];
        closes[10] = 150.0;
        let series = close_series(&closes);
        let result = compute_indicators(&series, &FundamentalsSnapshot::default());
        let vol = result.momentum.volatility_3m.expect("long series");
        assert!(vol > 0.0);
    }

    #[test]
    fn test_fundamentals_pass_through() {
        let fundamentals = FundamentalsSnapshot {
            trailing_pe: Some(31.2),
            forward_pe: Some(27.8),
            price_to_book: None,
        };
        let result = compute_indicators(&PriceSeries::empty(), &fundamentals);

        assert_eq!(result.valuation.trailing_pe, Some(31.2));
        assert_eq!(result.valuation.forward_pe, Some(27.8));
        assert_eq!(result.valuation.price_to_book, None);
    }

    #[test]
    fn test_idempotent() {
        let mut closes: Vec<f64> = Vec::new();
        for i in 0..80 {
            closes.push(100.0 + (i as f64) * 0.5);
        }
        let series = close_series(&closes);
        let fundamentals = FundamentalsSnapshot {
            trailing_pe: Some(20.0),
            forward_pe: None,
            price_to_book: Some(5.0),
        };

        let first = compute_indicators(&series, &fundamentals);
        let second = compute_indicators(&series, &fundamentals);
        assert_eq!(first, second);
    }

    #[test]
    fn test_payload_keys() {
        let result = compute_indicators(&close_series(&[100.0]), &FundamentalsSnapshot::default());
        let json = serde_json::to_value(&result).expect("serializable");

        assert_eq!(json["valuation"]["latestPrice"], 100.0);
        assert!(json["valuation"]["trailingPE"].is_null());
        assert!(json["momentum"]["oneMonthReturn"].is_null());
        assert!(json["momentum"]["volatility3m"].is_null());
        assert!(json["momentum"]["high3m"].is_null());
    }

    #[test]
    fn test_snapshot_moving_averages_gate_on_length() {
        let four = close_series(&[100.0, 101.0, 102.0, 103.0]);
        let snapshot = trading_day_snapshot(&four);
        assert_eq!(snapshot.ma5, None);

        let five = close_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let snapshot = trading_day_snapshot(&five);
        let ma5 = snapshot.ma5.expect("5 bars present");
        assert!((ma5 - 102.0).abs() < 1e-12);
        assert_eq!(snapshot.ma10, None);
        assert_eq!(snapshot.ma20, None);
    }

    #[test]
    fn test_snapshot_rsi_and_volume() {
        let short = close_series(&vec![100.0; 15]);
        assert_eq!(trading_day_snapshot(&short).rsi14, None);

        let mut closes = Vec::new();
        for i in 0..30 {
            closes.push(100.0 + f64::from(i % 5));
        }
        let series = close_series(&closes);
        let snapshot = trading_day_snapshot(&series);
        let rsi = snapshot.rsi14.expect("30 bars present");
        assert!((0.0..=100.0).contains(&rsi));
        assert_eq!(snapshot.volume, None);
        assert_eq!(snapshot.date.as_deref(), Some("2024-01-31"));
    }
}
