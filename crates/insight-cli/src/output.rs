//! Terminal rendering for analysis results

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use insight_core::{FinancialStatements, IndicatorResult, TradingDaySnapshot};
use insight_market::{MoveSource, PriceMove, StockSnapshot};
use insight_prompt::Language;

/// Quarters shown in the income statement table
const INCOME_QUARTERS: usize = 4;

fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn fmt_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.0}"))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a section heading
pub fn heading(language: Language, zh: &str, en: &str) {
    match language {
        Language::Chinese => println!("\n{zh}"),
        Language::English => println!("\n{en}"),
    }
}

/// Print the recent price move block
pub fn print_price_move(mv: &PriceMove, language: Language) {
    heading(language, "⏱ 近一小時 / 最近收盤價", "⏱ Recent price move");

    let label = match (language, mv.source) {
        (Language::Chinese, MoveSource::Intraday) => "最新價（近一小時）",
        (Language::Chinese, MoveSource::LastClose) => "最近收盤價",
        (Language::English, MoveSource::Intraday) => "Latest price (last hour)",
        (Language::English, MoveSource::LastClose) => "Last close",
    };
    println!(
        "{label}: {:.2} ({:+.2}, {:+.2}%)",
        mv.last,
        mv.change,
        mv.pct * 100.0
    );
}

/// Print the company profile block
pub fn print_profile(snapshot: &StockSnapshot, language: Language) {
    heading(language, "📌 基本資訊", "📌 Company profile");

    let Some(profile) = &snapshot.profile else {
        match language {
            Language::Chinese => println!("{}（無基本資料來源）", snapshot.symbol),
            Language::English => println!("{} (no profile source configured)", snapshot.symbol),
        }
        return;
    };

    let name = profile.name.as_deref().unwrap_or(&snapshot.symbol);
    println!("{name} ({})", snapshot.symbol);
    println!(
        "{} / {} | {} | {}",
        profile.sector.as_deref().unwrap_or("-"),
        profile.industry.as_deref().unwrap_or("-"),
        profile.exchange.as_deref().unwrap_or("-"),
        profile.currency.as_deref().unwrap_or("-"),
    );
}

/// Print the most-recent-trading-day table (moving averages, volume, RSI)
pub fn print_trading_day(day: &TradingDaySnapshot, language: Language) {
    heading(
        language,
        "📆 最近一個交易日：均線 / 成交量",
        "📆 Last trading day: moving averages / volume",
    );

    let (item, value, date_label, volume_label) = match language {
        Language::Chinese => ("項目", "數值", "日期", "成交量"),
        Language::English => ("Item", "Value", "Date", "Volume"),
    };

    let mut table = new_table();
    table.set_header(vec![item, value]);
    table.add_row(vec![
        date_label.to_string(),
        day.date.clone().unwrap_or_else(|| "N/A".to_string()),
    ]);
    table.add_row(vec!["MA5".to_string(), fmt_num(day.ma5)]);
    table.add_row(vec!["MA10".to_string(), fmt_num(day.ma10)]);
    table.add_row(vec!["MA20".to_string(), fmt_num(day.ma20)]);
    table.add_row(vec!["RSI(14)".to_string(), fmt_num(day.rsi14)]);
    table.add_row(vec![
        volume_label.to_string(),
        day.volume
            .map_or_else(|| "N/A".to_string(), |v| v.to_string()),
    ]);
    println!("{table}");
}

/// Print the indicator summary table
pub fn print_indicators(result: &IndicatorResult, language: Language) {
    heading(language, "📊 指標摘要", "📊 Indicator summary");

    let rows: [(&str, String); 9] = match language {
        Language::Chinese => [
            ("現價", fmt_num(result.valuation.latest_price)),
            ("本益比 (Trailing PE)", fmt_num(result.valuation.trailing_pe)),
            ("預估本益比 (Forward PE)", fmt_num(result.valuation.forward_pe)),
            ("股價淨值比 (P/B)", fmt_num(result.valuation.price_to_book)),
            ("1M 報酬率", fmt_pct(result.momentum.one_month_return)),
            ("3M 報酬率", fmt_pct(result.momentum.three_month_return)),
            ("3M 波動度", fmt_pct(result.momentum.volatility_3m)),
            ("3M 高點", fmt_num(result.momentum.high_3m)),
            ("3M 低點", fmt_num(result.momentum.low_3m)),
        ],
        Language::English => [
            ("Latest price", fmt_num(result.valuation.latest_price)),
            ("Trailing P/E", fmt_num(result.valuation.trailing_pe)),
            ("Forward P/E", fmt_num(result.valuation.forward_pe)),
            ("Price-to-book", fmt_num(result.valuation.price_to_book)),
            ("1M return", fmt_pct(result.momentum.one_month_return)),
            ("3M return", fmt_pct(result.momentum.three_month_return)),
            ("3M volatility", fmt_pct(result.momentum.volatility_3m)),
            ("3M high", fmt_num(result.momentum.high_3m)),
            ("3M low", fmt_num(result.momentum.low_3m)),
        ],
    };

    let (metric, value) = match language {
        Language::Chinese => ("指標", "數值"),
        Language::English => ("Metric", "Value"),
    };

    let mut table = new_table();
    table.set_header(vec![metric, value]);
    for (label, formatted) in rows {
        table.add_row(vec![label.to_string(), formatted]);
    }
    println!("{table}");
}

/// Print the recent quarterly income statement table, oldest quarter first
pub fn print_income(financials: &FinancialStatements, language: Language) {
    heading(language, "📑 最近四季損益表", "📑 Recent quarterly income");

    if financials.is_empty() {
        match language {
            Language::Chinese => println!("找不到損益資料"),
            Language::English => println!("No income statement data available"),
        }
        return;
    }

    let headers = match language {
        Language::Chinese => vec!["期間", "營收", "毛利", "營業利益", "淨利"],
        Language::English => vec![
            "Period",
            "Revenue",
            "Gross profit",
            "Operating income",
            "Net income",
        ],
    };

    let mut table = new_table();
    table.set_header(headers);
    // Provider order is most recent first; show oldest to newest
    for row in financials.recent_quarters(INCOME_QUARTERS).iter().rev() {
        table.add_row(vec![
            row.period.clone(),
            fmt_amount(row.total_revenue),
            fmt_amount(row.gross_profit),
            fmt_amount(row.operating_income),
            fmt_amount(row.net_income),
        ]);
    }
    println!("{table}");
}
