//! User message templates for the analysis layer

use insight_prompt::{JinjaTemplate, Result};

/// Create the indicator analysis user message template
///
/// `payload` is the indicator JSON; `question` is the user's question or
/// the default "analyze the current period" request.
pub fn analysis_request() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "analysis.user.analysis_request",
        r"以下是關於股票 {{ symbol }} 的指標資料（JSON）：

{{ payload }}

請根據這些資料，給出一份結構化的分析報告，格式包含：
1. 估值概況（本益比、股價淨值比等，大致是偏貴、偏便宜、還是合理區間）
2. 近期股價動能（1M / 3M 報酬率、波動度與高低點的解讀）
3. 亮點（列出 2–4 點）
4. 風險與需要特別留意的項目（列出 2–4 點）
5. 給一般投資人的提醒（不要當作投資建議）

使用者目前的提問是：
{{ question }}",
        r"Here is the indicator data for the stock {{ symbol }} (JSON):

{{ payload }}

Based on this data, produce a structured analysis report covering:
1. Valuation overview (P/E, price-to-book - roughly expensive, cheap, or fair)
2. Recent price momentum (1M / 3M returns, volatility, highs and lows)
3. Highlights (2-4 points)
4. Risks and items to watch closely (2-4 points)
5. A reminder for retail investors (not investment advice)

The user's current question is:
{{ question }}",
    )
}

/// Create the earnings insights user message template
pub fn earnings_request() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "analysis.user.earnings_request",
        r"下面是股票 {{ symbol }} 最近的部分財報數據（可能不完整）：

{{ payload }}

請整理成一段易讀的「財報亮點 / 風險 / 展望」說明，條列重點。",
        r"Below is partial recent financial report data for the stock {{ symbol }}
(possibly incomplete):

{{ payload }}

Summarize it into a readable highlights / risks / outlook note, as bullet
points.",
    )
}
