//! Lookback period selection

use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price history lookback period
///
/// The three spans the dashboard's period selector offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    /// Roughly one quarter of daily bars
    #[default]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl Period {
    /// Calendar days covered by the period
    pub fn days(self) -> i64 {
        match self {
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
        }
    }

    /// The selector label ("3mo", "6mo", "1y")
    pub fn as_str(self) -> &'static str {
        match self {
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            other => Err(MarketError::ConfigError(format!(
                "invalid period '{other}', expected one of: 3mo, 6mo, 1y"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("3mo".parse::<Period>().expect("valid"), Period::ThreeMonths);
        assert_eq!("6mo".parse::<Period>().expect("valid"), Period::SixMonths);
        assert_eq!("1y".parse::<Period>().expect("valid"), Period::OneYear);
        assert!("2w".parse::<Period>().is_err());
    }

    #[test]
    fn test_round_trip() {
        for period in [Period::ThreeMonths, Period::SixMonths, Period::OneYear] {
            assert_eq!(period.as_str().parse::<Period>().expect("valid"), period);
        }
    }

    #[test]
    fn test_days() {
        assert_eq!(Period::ThreeMonths.days(), 90);
        assert_eq!(Period::OneYear.days(), 365);
    }
}
