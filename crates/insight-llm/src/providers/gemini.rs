//! Google Gemini provider implementation
//!
//! This module implements the [`LLMProvider`] trait against the Gemini
//! `generateContent` REST endpoint.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Examples
//!
//! ## Basic usage with environment variable
//!
//! ```no_run
//! use insight_llm::{CompletionRequest, Message, LLMProvider};
//! use insight_llm::providers::GeminiProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create provider from GOOGLE_API_KEY environment variable
//!     let provider = GeminiProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("gemini-2.0-flash")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, Result, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the Gemini API
    /// Can be customized for proxies or regional endpoints.
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Optional list of supported models
    /// If None, any model string is accepted
    pub supported_models: Option<Vec<String>>,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            supported_models: None,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GOOGLE_API_KEY`. Optionally reads the base
    /// URL from `GEMINI_API_BASE` if set. Intended to run once at process
    /// start; the resulting config is then passed explicitly to whichever
    /// component performs the calls.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            crate::LLMError::ConfigurationError(
                "GOOGLE_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            supported_models: None,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set supported models list
    ///
    /// When set, the provider validates model names against this list.
    pub fn with_supported_models(mut self, models: Vec<String>) -> Self {
        self.supported_models = Some(models);
        self
    }
}

/// Google Gemini provider
///
/// Supports Gemini models such as:
/// - gemini-2.0-flash
/// - gemini-1.5-pro
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new Gemini provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider from environment variables
    ///
    /// Reads the API key from `GOOGLE_API_KEY` and, optionally, the base
    /// URL from `GEMINI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::with_config(config)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Validate model name against supported models list (if configured)
    fn validate_model(&self, model: &str) -> Result<()> {
        if let Some(supported) = &self.config.supported_models {
            if !supported.iter().any(|m| m == model) {
                return Err(crate::LLMError::InvalidRequest(format!(
                    "Model '{model}' is not in the supported models list: {supported:?}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API at {}", self.config.api_base);

        self.validate_model(&request.model)?;

        let gemini_request = build_gemini_request(&request);

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base, request.model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => crate::LLMError::AuthenticationFailed,
                429 => crate::LLMError::RateLimitExceeded(error_text),
                400 => crate::LLMError::InvalidRequest(error_text),
                404 => crate::LLMError::ModelNotFound(request.model),
                _ => crate::LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            crate::LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_gemini_response(gemini_response)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Gemini-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

// ============================================================================
// Gemini-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build a Gemini request from our generic format
///
/// The system instruction is carried on its own field; assistant turns use
/// the Gemini role name "model".
fn build_gemini_request(request: &CompletionRequest) -> GeminiRequest {
    let system_instruction = request.system.as_ref().map(|text| GeminiContent {
        role: None,
        parts: vec![GeminiPart { text: text.clone() }],
    });

    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: Some(gemini_role(msg).to_string()),
            parts: vec![GeminiPart {
                text: msg.content.clone(),
            }],
        })
        .collect();

    GeminiRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            stop_sequences: request.stop_sequences.clone(),
        },
    }
}

fn gemini_role(message: &Message) -> &'static str {
    match message.role {
        crate::Role::User => "user",
        crate::Role::Assistant => "model",
    }
}

/// Convert a Gemini response into our generic format
///
/// A response without candidates, or whose first candidate carries no text,
/// maps to [`crate::LLMError::EmptyResponse`] so the caller can substitute
/// its fallback.
fn parse_gemini_response(response: GeminiResponse) -> Result<CompletionResponse> {
    let usage = response
        .usage_metadata
        .map_or(
            TokenUsage {
                input_tokens: 0,
                output_tokens: 0,
            },
            |u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            },
        );

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(crate::LLMError::EmptyResponse)?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(crate::LLMError::EmptyResponse);
    }

    let stop_reason = map_finish_reason(candidate.finish_reason.as_deref());

    debug!(
        "Received response - stop_reason: {:?}, tokens: {}/{}",
        stop_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(text.trim().to_string()),
        stop_reason,
        usage,
    })
}

fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("STOP") => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") => StopReason::Safety,
        _ => StopReason::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("test-key");
        assert_eq!(config.api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.supported_models.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = GeminiConfig::new("test-key")
            .with_api_base("http://localhost:8080/v1beta")
            .with_timeout(30)
            .with_supported_models(vec!["gemini-2.0-flash".to_string()]);

        assert_eq!(config.api_base, "http://localhost:8080/v1beta");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.supported_models.as_deref(), Some(&["gemini-2.0-flash".to_string()][..]));
    }

    #[test]
    fn test_validate_model() {
        let provider = GeminiProvider::with_config(
            GeminiConfig::new("k").with_supported_models(vec!["gemini-2.0-flash".to_string()]),
        )
        .expect("client builds");

        assert!(provider.validate_model("gemini-2.0-flash").is_ok());
        assert!(provider.validate_model("gpt-4").is_err());
    }

    #[test]
    fn test_build_request_shape() {
        let request = CompletionRequest::builder("gemini-2.0-flash")
            .system("You are a stock analyst")
            .add_message(Message::user("Analyze AAPL"))
            .add_message(Message::assistant("Sure."))
            .max_tokens(512)
            .temperature(0.4)
            .build();

        let gemini_request = build_gemini_request(&request);
        let json = serde_json::to_value(&gemini_request).expect("serializable");

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a stock analyst"
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
        assert!((json["generationConfig"]["temperature"].as_f64().expect("set") - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Valuation looks stretched."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
        });
        let response: GeminiResponse = serde_json::from_value(raw).expect("parses");
        let completion = parse_gemini_response(response).expect("has text");

        assert_eq!(completion.message.text(), "Valuation looks stretched.");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.total(), 160);
    }

    #[test]
    fn test_parse_response_without_candidates_is_empty() {
        let raw = json!({"usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 0}});
        let response: GeminiResponse = serde_json::from_value(raw).expect("parses");
        let err = parse_gemini_response(response).expect_err("no candidates");
        assert!(matches!(err, crate::LLMError::EmptyResponse));
    }

    #[test]
    fn test_parse_response_with_blank_text_is_empty() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "   "}]},
                "finishReason": "SAFETY"
            }]
        });
        let response: GeminiResponse = serde_json::from_value(raw).expect("parses");
        let err = parse_gemini_response(response).expect_err("blank text");
        assert!(matches!(err, crate::LLMError::EmptyResponse));
    }

    #[test]
    fn test_map_finish_reason() {
        assert_eq!(map_finish_reason(Some("STOP")), StopReason::EndTurn);
        assert_eq!(map_finish_reason(Some("MAX_TOKENS")), StopReason::MaxTokens);
        assert_eq!(map_finish_reason(Some("SAFETY")), StopReason::Safety);
        assert_eq!(map_finish_reason(Some("RECITATION")), StopReason::Other);
        assert_eq!(map_finish_reason(None), StopReason::Other);
    }
}
