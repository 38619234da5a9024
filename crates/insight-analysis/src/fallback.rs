//! Rule-based fallback commentary
//!
//! Deterministic templates used whenever no language model is configured or
//! a call fails in a recoverable way. The output states that it is
//! template-generated so the reader never mistakes it for model output.

use insight_core::IndicatorResult;
use insight_prompt::Language;

/// Three-month return above this is treated as a clear uptrend, below the
/// negative as a clear downtrend.
const TREND_THRESHOLD: f64 = 0.05;

/// Keywords scanned for in the transcript word-count fallback.
const TRANSCRIPT_KEY_TERMS: [&str; 4] = ["guidance", "revenue", "margin", "profit"];

/// Format an optional ratio as a percentage with two decimals
fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

/// Format an optional number, or N/A
fn fmt_num(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

/// Classify the three-month trend at the ±5% thresholds
fn trend_label(three_month_return: Option<f64>, language: Language) -> &'static str {
    let Some(r) = three_month_return else {
        return "-";
    };
    match language {
        Language::Chinese => {
            if r > TREND_THRESHOLD {
                "明顯上升"
            } else if r < -TREND_THRESHOLD {
                "明顯下跌"
            } else {
                "相對震盪整理"
            }
        }
        Language::English => {
            if r > TREND_THRESHOLD {
                "clearly rising"
            } else if r < -TREND_THRESHOLD {
                "clearly falling"
            } else {
                "range-bound"
            }
        }
    }
}

/// Template-generated stock analysis
pub fn rule_based_stock_analysis(
    symbol: &str,
    indicators: &IndicatorResult,
    user_question: Option<&str>,
    language: Language,
) -> String {
    let val = &indicators.valuation;
    let mom = &indicators.momentum;
    let trend = trend_label(mom.three_month_return, language);

    match language {
        Language::Chinese => {
            let question_part = user_question
                .map(|q| format!("\n\n你問的問題：「{q}」\n"))
                .unwrap_or_default();
            format!(
                "## 📈 股票分析（規則版，未啟用 AI 模型）\n\n\
                 **股票：{symbol}**\n\n\
                 ### 🔹 1. 基本估值\n\
                 - 現價：{price}\n\
                 - 本益比（PE）：{pe}\n\
                 - 預估本益比（Forward PE）：{fpe}\n\n\
                 ### 🔹 2. 股價動能\n\
                 - 1 個月報酬：{one_m}（短期情緒參考）\n\
                 - 3 個月報酬：{three_m} → **{trend}**\n\n\
                 ### 🔹 3. 亮點（根據簡單規則推斷）\n\
                 - 3M 上漲視為多方氣氛較強。\n\
                 - Forward PE 若低於 PE，代表市場對未來成長有期待。\n\n\
                 ### 🔹 4. 風險\n\
                 - 若 3M 報酬率為負，須注意可能的下跌趨勢。\n\
                 - 若 PE 遠高於產業平均，可能有估值過高風險。\n\n\
                 ### 🔹 5. 說明\n\
                 ⚠ 目前尚未啟用生成式模型，因此本分析為「規則 + 模板」自動生成。\
                 {question_part}",
                price = fmt_num(val.latest_price),
                pe = fmt_num(val.trailing_pe),
                fpe = fmt_num(val.forward_pe),
                one_m = fmt_pct(mom.one_month_return),
                three_m = fmt_pct(mom.three_month_return),
            )
        }
        Language::English => {
            let question_part = user_question
                .map(|q| format!("\n\nYour question: \"{q}\"\n"))
                .unwrap_or_default();
            format!(
                "## 📈 Stock Analysis (rule-based, AI model disabled)\n\n\
                 **Stock: {symbol}**\n\n\
                 ### 🔹 1. Valuation\n\
                 - Latest price: {price}\n\
                 - Trailing P/E: {pe}\n\
                 - Forward P/E: {fpe}\n\n\
                 ### 🔹 2. Momentum\n\
                 - 1-month return: {one_m} (short-term sentiment)\n\
                 - 3-month return: {three_m} -> **{trend}**\n\n\
                 ### 🔹 3. Highlights (simple rules)\n\
                 - A rising 3M return suggests stronger bullish sentiment.\n\
                 - A forward P/E below the trailing P/E implies growth expectations.\n\n\
                 ### 🔹 4. Risks\n\
                 - A negative 3M return warrants caution about a downtrend.\n\
                 - A P/E far above the industry average may signal overvaluation.\n\n\
                 ### 🔹 5. Note\n\
                 ⚠ No generative model is enabled; this analysis is template-generated.\
                 {question_part}",
                price = fmt_num(val.latest_price),
                pe = fmt_num(val.trailing_pe),
                fpe = fmt_num(val.forward_pe),
                one_m = fmt_pct(mom.one_month_return),
                three_m = fmt_pct(mom.three_month_return),
            )
        }
    }
}

/// Template-generated earnings highlights
pub fn rule_based_earnings(symbol: &str, language: Language) -> String {
    match language {
        Language::Chinese => format!(
            "## 📝 財報亮點摘要（規則版）\n\n\
             股票：{symbol}\n\n\
             ### 🔹 可能的亮點\n\
             - 最近季度營收高於前季，通常被視為正向訊號。\n\
             - 毛利率提升代表成本控制較佳。\n\n\
             ### 🔹 潛在風險\n\
             - 淨利較上季下滑時，需留意獲利穩定度。\n\
             - 若營業活動現金流連續下滑，可能埋有財務壓力。\n\n\
             ### 🔹 提醒\n\
             ⚠ 本段仍為規則運算，並非真正模型解析逐字稿與財報。"
        ),
        Language::English => format!(
            "## 📝 Earnings Highlights (rule-based)\n\n\
             Stock: {symbol}\n\n\
             ### 🔹 Possible highlights\n\
             - Revenue above the prior quarter is usually read as positive.\n\
             - Improving gross margin points to better cost control.\n\n\
             ### 🔹 Potential risks\n\
             - A net income decline versus the prior quarter warrants attention.\n\
             - Consecutive drops in operating cash flow can hide financial stress.\n\n\
             ### 🔹 Reminder\n\
             ⚠ This section is rule-generated, not a model's read of filings."
        ),
    }
}

/// Template-generated transcript summary: length and keyword scan only
pub fn rule_based_transcript_summary(text: &str, language: Language) -> String {
    let word_count = text.split_whitespace().count();
    let lowered = text.to_lowercase();
    let found: Vec<&str> = TRANSCRIPT_KEY_TERMS
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect();

    match language {
        Language::Chinese => {
            let found_label = if found.is_empty() {
                "無明顯關鍵字".to_string()
            } else {
                found.join("、")
            };
            format!(
                "## 📘 文字摘要（規則版）\n\n\
                 - 文字長度：約 {word_count} 個英文單字或詞。\n\
                 - 偵測到的財務關鍵字：{found_label}\n\n\
                 ⚠ 未啟用生成式模型，因此僅能提供非常粗略的資訊。"
            )
        }
        Language::English => {
            let found_label = if found.is_empty() {
                "none detected".to_string()
            } else {
                found.join(", ")
            };
            format!(
                "## 📘 Text Summary (rule-based)\n\n\
                 - Length: about {word_count} words.\n\
                 - Financial keywords detected: {found_label}\n\n\
                 ⚠ No generative model is enabled; only this rough information is available."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::{Momentum, Valuation};

    fn indicators(three_month: Option<f64>) -> IndicatorResult {
        IndicatorResult {
            valuation: Valuation {
                latest_price: Some(187.5),
                trailing_pe: Some(29.3),
                forward_pe: None,
                price_to_book: Some(44.0),
            },
            momentum: Momentum {
                one_month_return: Some(0.021),
                three_month_return: three_month,
                volatility_3m: Some(0.012),
                high_3m: Some(199.0),
                low_3m: Some(164.0),
            },
        }
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend_label(Some(0.051), Language::Chinese), "明顯上升");
        assert_eq!(trend_label(Some(-0.051), Language::Chinese), "明顯下跌");
        assert_eq!(trend_label(Some(0.05), Language::Chinese), "相對震盪整理");
        assert_eq!(trend_label(Some(0.0), Language::English), "range-bound");
        assert_eq!(trend_label(None, Language::Chinese), "-");
    }

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(Some(0.1234)), "12.34%");
        assert_eq!(fmt_pct(None), "N/A");
    }

    #[test]
    fn test_stock_analysis_contains_metrics() {
        let text = rule_based_stock_analysis(
            "AAPL",
            &indicators(Some(0.08)),
            Some("估值是否偏貴？"),
            Language::Chinese,
        );

        assert!(text.contains("AAPL"));
        assert!(text.contains("187.50"));
        assert!(text.contains("2.10%"));
        assert!(text.contains("8.00%"));
        assert!(text.contains("明顯上升"));
        assert!(text.contains("估值是否偏貴？"));
        // Missing forward P/E renders as N/A, not zero
        assert!(text.contains("N/A"));
    }

    #[test]
    fn test_stock_analysis_without_question() {
        let text =
            rule_based_stock_analysis("AAPL", &indicators(None), None, Language::English);
        assert!(!text.contains("Your question"));
    }

    #[test]
    fn test_transcript_summary_keywords() {
        let text = rule_based_transcript_summary(
            "Revenue grew 12% and MARGIN expanded this quarter.",
            Language::English,
        );
        assert!(text.contains("revenue"));
        assert!(text.contains("margin"));
        assert!(!text.contains("guidance"));

        let none = rule_based_transcript_summary("nothing relevant here", Language::Chinese);
        assert!(none.contains("無明顯關鍵字"));
    }
}
