//! Command-line interface for insight-rs

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use insight_analysis::{AiAnalyzer, transcript_mentions_company};
use insight_core::{GuardLevel, compute_indicators, review_question, trading_day_snapshot};
use insight_llm::LLMProvider;
use insight_llm::providers::GeminiProvider;
use insight_market::{MarketConfig, MarketDataService, Period};
use insight_prompt::Language;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "insight")]
#[command(about = "US stock analysis with AI commentary", long_about = None)]
struct Cli {
    /// Output language (zh or en)
    #[arg(long, global = true, default_value = "zh")]
    lang: String,

    /// Gemini model used for commentary
    #[arg(long, global = true, default_value = "gemini-2.0-flash")]
    model: String,

    /// Skip the language model and use rule-based templates only
    #[arg(long, global = true)]
    no_ai: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch market data, compute indicators, and produce an analysis report
    Analyze {
        /// Stock ticker symbol (e.g. AAPL, TSLA, NVDA)
        symbol: String,

        /// Price history period
        #[arg(long, default_value = "3mo", value_parser = parse_period)]
        period: Period,

        /// Follow-up question for the AI (screened before forwarding)
        #[arg(long)]
        question: Option<String>,
    },
    /// Translate and summarize an earnings transcript or news text file
    Transcript {
        /// Stock ticker symbol the document should be about
        symbol: String,

        /// UTF-8 text file (txt / md)
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_period(s: &str) -> Result<Period, String> {
    s.parse::<Period>().map_err(|e| e.to_string())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve the LLM credential once at startup
///
/// Absence of a key is a mode, not an error: the analyzer then produces
/// rule-based commentary.
fn resolve_provider(no_ai: bool) -> Option<Arc<dyn LLMProvider>> {
    if no_ai {
        return None;
    }
    match GeminiProvider::from_env() {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "no Gemini credential, commentary will be rule-based");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let language = Language::from_code(&cli.lang);

    let market_config = Arc::new(MarketConfig::default().with_env_api_key());
    let service = MarketDataService::new(Arc::clone(&market_config));

    let provider = resolve_provider(cli.no_ai);
    let analyzer = AiAnalyzer::new(provider, Some(cli.model.clone()), language);

    match cli.command {
        Command::Analyze {
            symbol,
            period,
            question,
        } => run_analyze(&service, &analyzer, &symbol, period, question.as_deref()).await,
        Command::Transcript { symbol, file } => {
            run_transcript(&service, &analyzer, &symbol, &file).await
        }
    }
}

async fn run_analyze(
    service: &MarketDataService,
    analyzer: &AiAnalyzer,
    symbol: &str,
    period: Period,
    question: Option<&str>,
) -> anyhow::Result<()> {
    let language = analyzer.language();

    let snapshot = service
        .fetch_stock(symbol, period)
        .await
        .with_context(|| format!("failed to load market data for {symbol}"))?;
    let financials = service.fetch_financials(&snapshot.symbol).await;

    let indicators = compute_indicators(&snapshot.series, &snapshot.fundamentals);
    let day = trading_day_snapshot(&snapshot.series);

    match service.recent_price_move(&snapshot.symbol).await {
        Ok(Some(mv)) => output::print_price_move(&mv, language),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "recent price move unavailable"),
    }

    output::print_profile(&snapshot, language);
    output::print_trading_day(&day, language);
    output::print_indicators(&indicators, language);
    output::print_income(&financials, language);

    output::heading(language, "🤖 AI 數據分析", "🤖 AI analysis");
    let main_question = default_period_question(period, language);
    let summary = analyzer
        .generate_analysis(&snapshot.symbol, &indicators, Some(&main_question), None)
        .await?;
    println!("{summary}");

    output::heading(
        language,
        "📊 財報亮點 / 風險 / 展望",
        "📊 Earnings highlights / risks / outlook",
    );
    let insights = analyzer
        .extract_earnings_insights(&snapshot.symbol, &financials)
        .await?;
    println!("{insights}");

    if let Some(question) = question {
        output::heading(language, "🔍 追問 AI", "🔍 Follow-up question");

        let review = review_question(
            question,
            &snapshot.symbol,
            Some(&snapshot.series),
            Some(&financials),
        );

        if review.is_reject() {
            println!("{}", review.message);
            anyhow::bail!("question rejected");
        }
        if review.level == GuardLevel::Warn {
            println!("{}\n", review.message);
        }

        let follow_up = follow_up_question(period, question, language);
        let hint = (!review.system_hint.is_empty()).then_some(review.system_hint.as_str());
        let answer = analyzer
            .generate_analysis(&snapshot.symbol, &indicators, Some(&follow_up), hint)
            .await?;
        println!("{answer}");
    }

    Ok(())
}

async fn run_transcript(
    service: &MarketDataService,
    analyzer: &AiAnalyzer,
    symbol: &str,
    file: &Path,
) -> anyhow::Result<()> {
    let language = analyzer.language();

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    // Pull the profile so the relevance check can match the company name,
    // not just the ticker
    let snapshot = service
        .fetch_stock(symbol, Period::ThreeMonths)
        .await
        .with_context(|| format!("failed to load market data for {symbol}"))?;
    let display_name = snapshot
        .profile
        .as_ref()
        .and_then(|p| p.name.as_deref())
        .unwrap_or(&snapshot.symbol);

    if !transcript_mentions_company(&text, &snapshot.symbol, Some(display_name)) {
        match language {
            Language::Chinese => anyhow::bail!(
                "這份文字檔看起來不像是關於 {display_name} ({}) 的內容，請確認是否上傳錯誤公司。",
                snapshot.symbol
            ),
            Language::English => anyhow::bail!(
                "this document does not appear to be about {display_name} ({})",
                snapshot.symbol
            ),
        }
    }

    output::heading(language, "📄 逐段翻譯", "📄 Paragraph translation");
    let paragraphs = analyzer.translate_paragraphs(&text).await?;
    for paragraph in &paragraphs {
        println!("> {}", paragraph.original);
        println!("{}\n", paragraph.translated);
    }

    output::heading(language, "📘 文字重點摘要 / 分析", "📘 Summary / analysis");
    let summary = analyzer.analyze_transcript(&snapshot.symbol, &text).await?;
    println!("{summary}");

    Ok(())
}

/// The default "analyze the displayed period" request
fn default_period_question(period: Period, language: Language) -> String {
    match language {
        Language::Chinese => format!(
            "請針對目前取得的股價與基本面數據，特別聚焦在顯示的時間區間「{period}」做一份完整分析。\
             說明該期間內股價走勢、估值位置（例如本益比在產業中的相對高低）、\
             以及此期間可以觀察到的亮點與潛在風險。"
        ),
        Language::English => format!(
            "Using the price and fundamentals data retrieved, produce a full analysis focused on \
             the displayed period '{period}': price action over the period, where the valuation \
             sits (for example the P/E relative to the industry), and the highlights and risks \
             observable in this window."
        ),
    }
}

/// Frame a follow-up question to the displayed period
fn follow_up_question(period: Period, question: &str, language: Language) -> String {
    match language {
        Language::Chinese => format!(
            "目前圖上顯示的時間區間為「{period}」。請在這段期間的背景下，結合先前提供的數據，\
             回答以下追問，並盡量以該時間範圍內的變化為主：\n\n{question}"
        ),
        Language::English => format!(
            "The displayed period is '{period}'. Against that backdrop and the data provided \
             earlier, answer the following follow-up, focusing on changes within that window:\n\n\
             {question}"
        ),
    }
}
