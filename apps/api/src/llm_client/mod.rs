/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Handlers depend on the `TextGenerator` trait carried in `AppState`.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

#[cfg(test)]
pub(crate) mod fake;
pub mod normalize;
pub mod prompts;

use normalize::{excerpt, normalize, ReplyShape};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;
/// Delay before the first retry; doubles on each further attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A binary document sent to the model alongside the prompt.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Bytes,
}

/// Everything needed for one generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub attachments: Vec<Attachment>,
    pub temperature: Option<f32>,
    /// Lets the model ground its answer with Google Search.
    pub web_search: bool,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_attachment(mut self, mime_type: impl Into<String>, data: Bytes) -> Self {
        self.attachments.push(Attachment {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// Anything that turns a prompt into model text. `LlmClient` is the
/// production implementation; tests substitute canned replies.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate. Search-grounded
    /// answers are often split across several parts.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn build_request_body(request: &GenerationRequest) -> GeminiRequest<'_> {
    let mut parts = vec![RequestPart::Text {
        text: &request.prompt,
    }];
    parts.extend(request.attachments.iter().map(|a| RequestPart::InlineData {
        inline_data: InlineData {
            mime_type: &a.mime_type,
            data: BASE64.encode(&a.data),
        },
    }));

    GeminiRequest {
        contents: vec![GeminiContent { role: "user", parts }],
        generation_config: request
            .temperature
            .map(|temperature| GenerationConfig { temperature }),
        tools: if request.web_search {
            vec![serde_json::json!({ "google_search": {} })]
        } else {
            Vec::new()
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Gemini `generateContent` API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(120)).build()?,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            backoff: RETRY_BACKOFF,
        })
    }

    /// Points the client at another `generateContent` host with a shorter
    /// retry delay.
    #[cfg(test)]
    fn with_endpoint(mut self, base_url: impl Into<String>, backoff: Duration) -> Self {
        self.base_url = base_url.into();
        self.backoff = backoff;
        self
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, request: &GenerationRequest) -> Result<GeminiResponse, LlmError> {
        let url = format!("{}/{MODEL}:generateContent", self.base_url);
        let request_body = build_request_body(request);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, excerpt(&body));
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let gemini_response: GeminiResponse = response.json().await?;

            if let Some(usage) = &gemini_response.usage_metadata {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(gemini_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}

/// Calls the model and recovers a JSON value of the requested shape from its
/// reply. The prompt must instruct the model to return JSON.
pub async fn generate_json(
    llm: &dyn TextGenerator,
    request: &GenerationRequest,
    shape: ReplyShape,
) -> Result<Value, AppError> {
    let reply = llm
        .generate(request)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    debug!("Raw model reply (first 500 chars): {}", excerpt(&reply));

    Ok(normalize(&reply, shape)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_text_only() {
        let request = GenerationRequest::text("hello");
        let body = serde_json::to_value(build_request_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })
        );
    }

    #[test]
    fn test_request_body_with_attachment_temperature_and_search() {
        let request = GenerationRequest::text("read this")
            .with_attachment("image/png", Bytes::from_static(b"abc"))
            .with_temperature(0.1)
            .with_web_search();
        let body = serde_json::to_value(build_request_body(&request)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "read this");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "YWJj");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(body["tools"][0], serde_json::json!({"google_search": {}}));
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GeminiResponse =
            serde_json::from_value(serde_json::json!({"promptFeedback": {}})).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_response_blank_text_is_none() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "  "}]}}]
        }))
        .unwrap();
        assert!(response.text().is_none());
    }

    const GENERATE_PATH: &str = "/gemini-2.5-flash:generateContent";

    fn client_for(server: &mockito::Server) -> LlmClient {
        LlmClient::new("test-key".to_string())
            .unwrap()
            .with_endpoint(server.url(), Duration::from_millis(5))
    }

    fn reply_body(text: &str) -> String {
        serde_json::json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
    }

    #[tokio::test]
    async fn test_call_retries_server_error_then_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let unavailable = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "test-key")
            .with_status(503)
            .with_body("overloaded")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_body("{\"ok\": true}"))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let text = client.generate(&GenerationRequest::text("hi")).await.unwrap();

        assert_eq!(text, "{\"ok\": true}");
        unavailable.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_retries_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("POST", GENERATE_PATH)
            .with_status(429)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(reply_body("[]"))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.generate(&GenerationRequest::text("hi")).await.unwrap(), "[]");
        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let rejected = server
            .mock("POST", GENERATE_PATH)
            .with_status(400)
            .with_body(r#"{"error": {"code": 400, "message": "API key not valid"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.call(&GenerationRequest::text("hi")).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        rejected.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_gives_up_after_max_retries() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", GENERATE_PATH)
            .with_status(500)
            .with_body("internal")
            .expect(MAX_RETRIES as usize)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.call(&GenerationRequest::text("hi")).await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 500, .. }));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_without_text_is_empty_content() {
        let mut server = mockito::Server::new_async().await;
        let _blocked = server
            .mock("POST", GENERATE_PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.generate(&GenerationRequest::text("hi")).await.unwrap_err();

        assert!(matches!(err, LlmError::EmptyContent));
    }
}
