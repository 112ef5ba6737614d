//! Text-generation model client.
//!
//! The intent parser only needs "prompt in, text out", so the seam is the
//! small [`TextModel`] trait. [`GeminiClient`] talks to the Google
//! generative-language REST API; tests substitute a scripted model.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::settings::{GeminiSettings, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};

/// Errors that can occur while calling a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key configured.
    #[error("model API key not set")]
    NoApiKey,

    /// The request never got an answer.
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-2xx status.
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The answer did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// A model that completes a prompt with text.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Sends `prompt` once and returns the raw completion text.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Model name for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Client for `POST {base}/v1/models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_API_URL.to_string(),
        }
    }

    pub fn from_settings(settings: &GeminiSettings) -> Self {
        Self::new(settings.api_key.clone())
            .with_model(&settings.model)
            .with_base_url(&settings.api_url)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or(ModelError::NoApiKey)?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 512,
            },
        };

        debug!(model = %self.model, "Calling Gemini");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModelError::ParseError(e.to_string()))?;

        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ModelError::ParseError("No text in response".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = GeminiClient::new(None).with_base_url("http://127.0.0.1:9");
        let result = client.generate("hi").await;
        assert!(matches!(result, Err(ModelError::NoApiKey)));
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn test_generate_reads_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "k"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "prompt text"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"intent\":\"unknown\"}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(Some("k".into())).with_base_url(server.uri());
        let text = client.generate("prompt text").await.unwrap();
        assert_eq!(text, "{\"intent\":\"unknown\"}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(Some("k".into())).with_base_url(server.uri());
        match client.generate("x").await {
            Err(ModelError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::new(Some("k".into())).with_base_url(server.uri());
        assert!(matches!(
            client.generate("x").await,
            Err(ModelError::ParseError(_))
        ));
    }
}
