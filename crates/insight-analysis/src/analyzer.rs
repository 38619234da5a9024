//! AI analyzer with rule-based fallback
//!
//! Holds an optional [`LLMProvider`] injected by the caller (the credential
//! is resolved once at process start, never read from the environment here)
//! and decides per error kind whether a failed call degrades to the
//! rule-based template or propagates.

use crate::error::Result;
use crate::{fallback, prompts};
use insight_core::{FinancialStatements, IndicatorResult, clean_text};
use insight_llm::{CompletionRequest, LLMProvider, Message};
use insight_prompt::Language;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Character budget for transcript text spliced into a prompt
const TRANSCRIPT_PROMPT_LIMIT: usize = 15_000;

/// Characters of the source paragraph echoed into placeholder translations
const PLACEHOLDER_PREVIEW_CHARS: usize = 40;

/// One transcript paragraph with its translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedParagraph {
    pub original: String,
    pub translated: String,
}

/// Narrative commentary generator
///
/// Without a provider and model every method returns its deterministic
/// rule-based rendition immediately; with them, recoverable call failures
/// fall back to the same rendition while caller bugs propagate.
pub struct AiAnalyzer {
    provider: Option<Arc<dyn LLMProvider>>,
    model: Option<String>,
    language: Language,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl AiAnalyzer {
    /// Create an analyzer
    ///
    /// `provider` and `model` are both required for live generation; when
    /// either is absent the analyzer stays in rule-based mode.
    pub fn new(
        provider: Option<Arc<dyn LLMProvider>>,
        model: Option<String>,
        language: Language,
    ) -> Self {
        Self {
            provider,
            model,
            language,
            max_tokens: 2048,
            temperature: None,
        }
    }

    /// Override the generation token budget
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The configured output language
    pub fn language(&self) -> Language {
        self.language
    }

    fn backend(&self) -> Option<(&dyn LLMProvider, &str)> {
        match (&self.provider, &self.model) {
            (Some(provider), Some(model)) => Some((provider.as_ref(), model.as_str())),
            _ => None,
        }
    }

    /// Generate the indicator analysis narrative
    ///
    /// `guard_hint` is the question guard's instruction for the model and is
    /// spliced into the system prompt when non-empty.
    pub async fn generate_analysis(
        &self,
        symbol: &str,
        indicators: &IndicatorResult,
        user_question: Option<&str>,
        guard_hint: Option<&str>,
    ) -> Result<String> {
        let Some((provider, model)) = self.backend() else {
            debug!(symbol, "no model configured, using rule-based analysis");
            return Ok(fallback::rule_based_stock_analysis(
                symbol,
                indicators,
                user_question,
                self.language,
            ));
        };

        let system = prompts::advisor()?.render(
            self.language,
            &json!({ "guard_hint": guard_hint.unwrap_or("") }),
        )?;
        let payload = serde_json::to_string_pretty(indicators)?;
        let question = user_question.unwrap_or(match self.language {
            Language::Chinese => "「沒有額外提問，只是想看這檔股票在目前區間的綜合分析。」",
            Language::English => "No specific question - a general analysis of the current period.",
        });
        let user = prompts::analysis_request()?.render(
            self.language,
            &json!({ "symbol": symbol, "payload": payload, "question": question }),
        )?;

        match self.complete(provider, model, system, user).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_recoverable() => {
                warn!(symbol, error = %e, "LLM call failed, using rule-based analysis");
                Ok(fallback::rule_based_stock_analysis(
                    symbol,
                    indicators,
                    user_question,
                    self.language,
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Summarize recent quarterly statements into highlights and risks
    pub async fn extract_earnings_insights(
        &self,
        symbol: &str,
        financials: &FinancialStatements,
    ) -> Result<String> {
        let Some((provider, model)) = self.backend() else {
            return Ok(fallback::rule_based_earnings(symbol, self.language));
        };

        let system = prompts::earnings_analyst()?.render(self.language, &json!({}))?;
        let payload = serde_json::to_string_pretty(financials.recent_quarters(4))?;
        let user = prompts::earnings_request()?.render(
            self.language,
            &json!({ "symbol": symbol, "payload": payload }),
        )?;

        match self.complete(provider, model, system, user).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_recoverable() => {
                warn!(symbol, error = %e, "LLM call failed, using rule-based earnings note");
                Ok(fallback::rule_based_earnings(symbol, self.language))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Summarize a whole transcript or news text
    pub async fn analyze_transcript(&self, symbol: &str, text: &str) -> Result<String> {
        let cleaned = clean_text(text);

        let Some((provider, model)) = self.backend() else {
            return Ok(fallback::rule_based_transcript_summary(
                &cleaned,
                self.language,
            ));
        };

        let system =
            prompts::transcript_analyst()?.render(self.language, &json!({ "symbol": symbol }))?;
        let user = truncate_chars(&cleaned, TRANSCRIPT_PROMPT_LIMIT).to_string();

        match self.complete(provider, model, system, user).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_recoverable() => {
                warn!(symbol, error = %e, "LLM call failed, using rule-based summary");
                Ok(fallback::rule_based_transcript_summary(
                    &cleaned,
                    self.language,
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Translate a transcript paragraph by paragraph
    ///
    /// Without a model every paragraph gets a placeholder; a recoverable
    /// failure degrades only the affected paragraph.
    pub async fn translate_paragraphs(&self, text: &str) -> Result<Vec<TranslatedParagraph>> {
        let normalized = text.replace('\r', "\n");
        let paragraphs: Vec<&str> = normalized
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let Some((provider, model)) = self.backend() else {
            return Ok(paragraphs
                .into_iter()
                .map(|p| TranslatedParagraph {
                    original: p.to_string(),
                    translated: format!(
                        "（此段落的中文摘要示意）{}...",
                        truncate_chars(p, PLACEHOLDER_PREVIEW_CHARS)
                    ),
                })
                .collect());
        };

        let system = prompts::translator()?.render(self.language, &json!({}))?;

        let mut results = Vec::with_capacity(paragraphs.len());
        for paragraph in paragraphs {
            let translated = match self
                .complete(provider, model, system.clone(), paragraph.to_string())
                .await
            {
                Ok(text) => text,
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "paragraph translation failed");
                    format!(
                        "（翻譯失敗，以下為原文前 {} 字）{}...",
                        PLACEHOLDER_PREVIEW_CHARS,
                        truncate_chars(paragraph, PLACEHOLDER_PREVIEW_CHARS)
                    )
                }
                Err(e) => return Err(e.into()),
            };
            results.push(TranslatedParagraph {
                original: paragraph.to_string(),
                translated,
            });
        }

        Ok(results)
    }

    async fn complete(
        &self,
        provider: &dyn LLMProvider,
        model: &str,
        system: String,
        user: String,
    ) -> insight_llm::Result<String> {
        let mut builder = CompletionRequest::builder(model)
            .system(system)
            .add_message(Message::user(user))
            .max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }

        let response = provider.complete(builder.build()).await?;
        Ok(response.message.text().to_string())
    }
}

/// Whether an uploaded document plausibly concerns the company
///
/// Matches the symbol, the display name, and each display-name token longer
/// than two characters, case-insensitively.
pub fn transcript_mentions_company(text: &str, symbol: &str, display_name: Option<&str>) -> bool {
    let lowered = text.to_lowercase();

    let mut keywords: Vec<String> = vec![symbol.trim().to_lowercase()];
    if let Some(name) = display_name {
        let name_lower = name.trim().to_lowercase();
        for token in name_lower.replace(',', " ").split_whitespace() {
            if token.chars().count() > 2 {
                keywords.push(token.to_string());
            }
        }
        keywords.push(name_lower);
    }

    keywords
        .iter()
        .any(|k| !k.is_empty() && lowered.contains(k))
}

/// Truncate on a character boundary
fn truncate_chars(s: &str, limit: usize) -> &str {
    s.char_indices().nth(limit).map_or(s, |(i, _)| &s[..i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insight_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};

    enum StubOutcome {
        Reply(String),
        EmptyResponse,
        InvalidRequest,
    }

    struct StubProvider {
        outcome: StubOutcome,
    }

    #[async_trait]
    impl LLMProvider for StubProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> insight_llm::Result<CompletionResponse> {
            match &self.outcome {
                StubOutcome::Reply(text) => Ok(CompletionResponse {
                    message: Message::assistant(text.clone()),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage {
                        input_tokens: 10,
                        output_tokens: 10,
                    },
                }),
                StubOutcome::EmptyResponse => Err(LLMError::EmptyResponse),
                StubOutcome::InvalidRequest => {
                    Err(LLMError::InvalidRequest("bad payload".to_string()))
                }
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn analyzer_with(outcome: StubOutcome) -> AiAnalyzer {
        AiAnalyzer::new(
            Some(Arc::new(StubProvider { outcome })),
            Some("stub-model".to_string()),
            Language::Chinese,
        )
    }

    fn sample_indicators() -> IndicatorResult {
        IndicatorResult::default()
    }

    #[tokio::test]
    async fn test_without_model_uses_fallback() {
        let analyzer = AiAnalyzer::new(None, None, Language::Chinese);
        let text = analyzer
            .generate_analysis("AAPL", &sample_indicators(), None, None)
            .await
            .expect("fallback never errors");
        assert!(text.contains("規則版"));
    }

    #[tokio::test]
    async fn test_provider_reply_passes_through() {
        let analyzer = analyzer_with(StubOutcome::Reply("模型生成的分析".to_string()));
        let text = analyzer
            .generate_analysis("AAPL", &sample_indicators(), Some("估值如何？"), None)
            .await
            .expect("provider succeeds");
        assert_eq!(text, "模型生成的分析");
    }

    #[tokio::test]
    async fn test_recoverable_error_falls_back() {
        let analyzer = analyzer_with(StubOutcome::EmptyResponse);
        let text = analyzer
            .generate_analysis("AAPL", &sample_indicators(), None, None)
            .await
            .expect("recoverable error degrades");
        assert!(text.contains("規則版"));
    }

    #[tokio::test]
    async fn test_non_recoverable_error_propagates() {
        let analyzer = analyzer_with(StubOutcome::InvalidRequest);
        let result = analyzer
            .generate_analysis("AAPL", &sample_indicators(), None, None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_earnings_without_model() {
        let analyzer = AiAnalyzer::new(None, None, Language::English);
        let text = analyzer
            .extract_earnings_insights("AAPL", &FinancialStatements::default())
            .await
            .expect("fallback never errors");
        assert!(text.contains("rule-based"));
    }

    #[tokio::test]
    async fn test_transcript_without_model_counts_words() {
        let analyzer = AiAnalyzer::new(None, None, Language::Chinese);
        let text = analyzer
            .analyze_transcript("AAPL", "revenue grew and margin expanded")
            .await
            .expect("fallback never errors");
        assert!(text.contains("5 個"));
        assert!(text.contains("revenue"));
    }

    #[tokio::test]
    async fn test_translate_without_model_yields_placeholders() {
        let analyzer = AiAnalyzer::new(None, None, Language::Chinese);
        let paragraphs = analyzer
            .translate_paragraphs("First paragraph.\r\n\nSecond paragraph.")
            .await
            .expect("placeholders never error");

        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].original, "First paragraph.");
        assert!(paragraphs[0].translated.contains("First paragraph."));
        assert!(paragraphs[0].translated.contains("中文摘要示意"));
    }

    #[tokio::test]
    async fn test_translate_recoverable_error_degrades_paragraph() {
        let analyzer = analyzer_with(StubOutcome::EmptyResponse);
        let paragraphs = analyzer
            .translate_paragraphs("Only paragraph.")
            .await
            .expect("degrades per paragraph");
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].translated.contains("翻譯失敗"));
    }

    #[test]
    fn test_transcript_mentions_company() {
        let text = "Apple reported record revenue in the June quarter.";
        assert!(transcript_mentions_company(text, "AAPL", Some("Apple Inc.")));
        // Symbol match alone is enough
        assert!(transcript_mentions_company("ticker: aapl", "AAPL", None));
        // Short tokens like "inc" are skipped, the full name still matches
        assert!(!transcript_mentions_company(
            "Unrelated memo about another firm.",
            "AAPL",
            Some("Apple Inc.")
        ));
    }

    #[test]
    fn test_truncate_chars_on_boundary() {
        assert_eq!(truncate_chars("營收成長", 2), "營收");
        assert_eq!(truncate_chars("ab", 40), "ab");
    }
}
