//! Question guard
//!
//! Classifies a free-text follow-up question before it is forwarded to the
//! language model: obviously unusable input is rejected outright, while
//! questions that merely look off-topic or reference years outside the
//! loaded data produce advisory warnings plus a hint spliced into the
//! downstream system prompt. The guard holds no state across calls.

use crate::fundamentals::FinancialStatements;
use crate::series::PriceSeries;
use crate::text::clean_text;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Minimum share of letters/digits/CJK ideographs for a question to be
/// considered readable rather than keyboard noise.
const MIN_INFORMATIVE_RATIO: f64 = 0.35;

/// Questions of this many characters or fewer are rejected as too short.
const MIN_QUESTION_CHARS: usize = 3;

/// Chinese finance vocabulary checked by substring match.
const FINANCE_KEYWORDS_ZH: [&str; 15] = [
    "營收", "獲利", "毛利", "淨利", "成長", "估值", "本益比", "股價", "股息", "配息", "現金流",
    "財報", "季度", "展望", "風險",
];

/// English finance vocabulary checked case-insensitively.
const FINANCE_KEYWORDS_EN: [&str; 12] = [
    "revenue",
    "profit",
    "margin",
    "guidance",
    "valuation",
    "dividend",
    "eps",
    "cash flow",
    "earnings",
    "quarter",
    "risk",
    "growth",
];

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(19|20)\d{2}").expect("year pattern is valid"));

/// Admission level for a reviewed question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardLevel {
    /// Forward as-is
    Ok,
    /// Forward, but show the advisory message and splice the hint into the
    /// system prompt
    Warn,
    /// Do not forward
    Reject,
}

/// Machine-readable reason backing the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardReason {
    Pass,
    Warn,
    Empty,
    TooShort,
    Gibberish,
}

/// Outcome of reviewing one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardVerdict {
    pub level: GuardLevel,
    pub reason: GuardReason,
    /// User-facing advisory or rejection text; empty when `Ok`
    pub message: String,
    /// Extra instruction for the downstream system prompt; empty unless
    /// the level is `Warn`
    pub system_hint: String,
}

impl GuardVerdict {
    fn pass() -> Self {
        Self {
            level: GuardLevel::Ok,
            reason: GuardReason::Pass,
            message: String::new(),
            system_hint: String::new(),
        }
    }

    fn reject(reason: GuardReason, message: &str) -> Self {
        Self {
            level: GuardLevel::Reject,
            reason,
            message: message.to_string(),
            system_hint: String::new(),
        }
    }

    fn warn(messages: &[String], hints: &[String]) -> Self {
        Self {
            level: GuardLevel::Warn,
            reason: GuardReason::Warn,
            message: messages.join("\n\n"),
            system_hint: hints.join("\n"),
        }
    }

    /// Whether the question must not be forwarded
    pub fn is_reject(&self) -> bool {
        self.level == GuardLevel::Reject
    }
}

/// Review a free-text question against the loaded data
///
/// Single pass: empty and too-short input and keyboard noise are rejected;
/// missing finance vocabulary and years outside the data's coverage only
/// accumulate warnings. Period labels that cannot be parsed for a year are
/// silently skipped.
pub fn review_question(
    question: &str,
    symbol: &str,
    price_history: Option<&PriceSeries>,
    financials: Option<&FinancialStatements>,
) -> GuardVerdict {
    let q = clean_text(question);
    debug!(symbol, "reviewing follow-up question");

    if q.is_empty() {
        return GuardVerdict::reject(
            GuardReason::Empty,
            "❌ 問題內容是空的，請具體輸入想分析的重點或疑問。",
        );
    }

    let total_chars = q.chars().count();
    if total_chars <= MIN_QUESTION_CHARS {
        return GuardVerdict::reject(
            GuardReason::TooShort,
            "❌ 問題太短了，請再具體一些（例如：想看哪一段期間、估值、財報或風險？）。",
        );
    }

    let informative = q.chars().filter(|c| is_informative(*c)).count();
    if (informative as f64) / (total_chars as f64) < MIN_INFORMATIVE_RATIO {
        return GuardVerdict::reject(
            GuardReason::Gibberish,
            "❌ 這個問題看起來像是隨機字元或無法判讀的內容，請重新敘述你的問題。",
        );
    }

    let mut warn_messages: Vec<String> = Vec::new();
    let mut system_hints: Vec<String> = Vec::new();

    let lowered = q.to_lowercase();
    let has_finance_keyword = FINANCE_KEYWORDS_ZH.iter().any(|kw| q.contains(kw))
        || FINANCE_KEYWORDS_EN.iter().any(|kw| lowered.contains(kw));

    if !has_finance_keyword {
        warn_messages.push(
            "⚠ 這個問題沒有明顯的財經 / 股價 / 財報關鍵字，我會盡量從一般角度回答，\
             但也可能提醒你這個工具主要是用來做股票與財報分析。"
                .to_string(),
        );
        system_hints.push(
            "若使用者提問與股票 / 財報 / 金融無直接關聯，請先說明本工具主要用途，\
             再視情況簡要回答；若完全無關，建議禮貌回覆無法回答。"
                .to_string(),
        );
    }

    let question_years: Vec<i32> = YEAR_PATTERN
        .find_iter(&q)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    let data_years = collect_data_years(price_history, financials);

    if !question_years.is_empty() {
        if let (Some(&min_year), Some(&max_year)) =
            (data_years.iter().min(), data_years.iter().max())
        {
            let mut out_of_range: Vec<i32> = question_years
                .into_iter()
                .filter(|y| *y < min_year || *y > max_year)
                .collect();
            out_of_range.sort_unstable();
            out_of_range.dedup();

            if !out_of_range.is_empty() {
                warn_messages.push(format!(
                    "⚠ 問題中提到的年份 {out_of_range:?} 超出目前資料範圍 \
                     （約 {min_year} ~ {max_year}），回答時會盡量以可取得的年份說明，並提醒這一點。"
                ));
                system_hints.push(
                    "使用者問題涉及資料範圍以外的年份時，請先明確說明資料僅涵蓋的區間，\
                     再依現有資料做推論；對於沒有資料的年份，不要虛構具體數字或事件。"
                        .to_string(),
                );
            }
        }
    }

    if warn_messages.is_empty() {
        GuardVerdict::pass()
    } else {
        GuardVerdict::warn(&warn_messages, &system_hints)
    }
}

/// Letters, digits, and CJK ideographs count as informative content
fn is_informative(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Calendar years covered by the price history and statement periods
fn collect_data_years(
    price_history: Option<&PriceSeries>,
    financials: Option<&FinancialStatements>,
) -> Vec<i32> {
    let mut years: Vec<i32> = price_history
        .map(|series| series.years().into_iter().collect())
        .unwrap_or_default();

    if let Some(statements) = financials {
        years.extend(
            statements
                .income_quarterly
                .iter()
                .filter_map(|row| period_year(&row.period)),
        );
    }

    years
}

/// Extract a calendar year from a statement period label
///
/// Tries a date parse first, then falls back to scanning for an embedded
/// 4-digit year. Labels yielding neither are treated as carrying no year.
fn period_year(period: &str) -> Option<i32> {
    if let Ok(date) = NaiveDate::parse_from_str(period, "%Y-%m-%d") {
        return Some(date.year());
    }
    YEAR_PATTERN
        .find(period)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::QuarterlyIncome;
    use crate::series::Bar;
    use chrono::{TimeZone, Utc};

    fn series_for_years(years: &[i32]) -> PriceSeries {
        PriceSeries::new(
            years
                .iter()
                .map(|&y| {
                    Bar::new(
                        Utc.with_ymd_and_hms(y, 6, 3, 0, 0, 0)
                            .single()
                            .expect("valid date"),
                        100.0,
                    )
                })
                .collect(),
        )
    }

    fn statements_for_periods(periods: &[&str]) -> FinancialStatements {
        FinancialStatements {
            income_quarterly: periods
                .iter()
                .map(|p| QuarterlyIncome {
                    period: (*p).to_string(),
                    total_revenue: Some(1.0e9),
                    net_income: Some(1.0e8),
                    gross_profit: None,
                    operating_income: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_question_rejected() {
        let verdict = review_question("", "AAPL", None, None);
        assert_eq!(verdict.level, GuardLevel::Reject);
        assert_eq!(verdict.reason, GuardReason::Empty);
        assert!(!verdict.message.is_empty());
        assert!(verdict.system_hint.is_empty());

        // Whitespace-only input collapses to empty
        let verdict = review_question("  \n\r  ", "AAPL", None, None);
        assert_eq!(verdict.reason, GuardReason::Empty);
    }

    #[test]
    fn test_too_short_rejected() {
        let verdict = review_question("ab", "AAPL", None, None);
        assert_eq!(verdict.level, GuardLevel::Reject);
        assert_eq!(verdict.reason, GuardReason::TooShort);

        // Boundary: exactly 3 chars still rejected
        let verdict = review_question("abc", "AAPL", None, None);
        assert_eq!(verdict.reason, GuardReason::TooShort);
    }

    #[test]
    fn test_gibberish_rejected() {
        let verdict = review_question("!!!???###@@@", "AAPL", None, None);
        assert_eq!(verdict.level, GuardLevel::Reject);
        assert_eq!(verdict.reason, GuardReason::Gibberish);
    }

    #[test]
    fn test_no_finance_keyword_warns() {
        let verdict = review_question("今天天氣如何", "AAPL", None, None);
        assert_eq!(verdict.level, GuardLevel::Warn);
        assert_eq!(verdict.reason, GuardReason::Warn);
        assert!(verdict.message.contains("關鍵字"));
        assert!(!verdict.system_hint.is_empty());
    }

    #[test]
    fn test_finance_question_in_range_passes() {
        let series = series_for_years(&[2020, 2021, 2022, 2023, 2024]);
        let verdict = review_question("2023年營收成長", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Ok);
        assert_eq!(verdict.reason, GuardReason::Pass);
        assert!(verdict.message.is_empty());
        assert!(verdict.system_hint.is_empty());
    }

    #[test]
    fn test_out_of_range_year_warns() {
        let series = series_for_years(&[2020, 2024]);
        let verdict = review_question("2030年營收展望", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Warn);
        assert!(verdict.message.contains("2030"));
        assert!(verdict.message.contains("2020"));
        assert!(verdict.message.contains("2024"));
        assert!(verdict.system_hint.contains("年份"));
    }

    #[test]
    fn test_statement_periods_extend_data_years() {
        // Price data only covers 2024, statements reach back to 2022
        let series = series_for_years(&[2024]);
        let statements = statements_for_periods(&["2023-09-30", "Q4 2022", "n/a"]);
        let verdict =
            review_question("2022年營收表現如何", "AAPL", Some(&series), Some(&statements));
        assert_eq!(verdict.level, GuardLevel::Ok);
    }

    #[test]
    fn test_unparseable_periods_silently_ignored() {
        let statements = statements_for_periods(&["latest", "-", ""]);
        // Statements carry no usable years and there is no price data, so
        // the year check cannot fire at all
        let verdict = review_question("2030年營收展望", "AAPL", None, Some(&statements));
        assert_eq!(verdict.level, GuardLevel::Ok);
    }

    #[test]
    fn test_question_without_years_skips_range_check() {
        let series = series_for_years(&[2024]);
        let verdict = review_question("請分析最近的營收與風險", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Ok);
    }

    #[test]
    fn test_warnings_accumulate() {
        let series = series_for_years(&[2023, 2024]);
        // Off-topic AND out-of-range year: both warnings, joined by a blank
        // line, with hints on separate lines
        let verdict = review_question("1999年的天氣如何", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Warn);
        assert!(verdict.message.contains("\n\n"));
        assert_eq!(verdict.system_hint.lines().count(), 2);
    }

    #[test]
    fn test_english_keywords_case_insensitive() {
        let verdict = review_question("What is the REVENUE outlook?", "AAPL", None, None);
        assert_eq!(verdict.level, GuardLevel::Ok);
    }

    #[test]
    fn test_duplicate_out_of_range_years_deduplicated() {
        let series = series_for_years(&[2024]);
        let verdict =
            review_question("比較2030年與2030年的營收", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Warn);
        assert!(verdict.message.contains("[2030]"));
    }

    #[test]
    fn test_full_four_digit_years_extracted() {
        let series = series_for_years(&[2020, 2024]);
        // 2021 is inside the covered range; the guard must compare the full
        // 4-digit token, not a truncated prefix
        let verdict = review_question("2021年營收如何", "AAPL", Some(&series), None);
        assert_eq!(verdict.level, GuardLevel::Ok);
    }
}
