//! Native Gemini client with constrained decoding.
//!
//! Calls `POST {base}/models/{model}:generateContent` with the page image as
//! inline data and a `generationConfig` carrying
//! `responseMimeType: application/json` plus the normalized
//! `responseSchema`, so the reply is guaranteed to parse against the layout
//! schema (modulo service bugs, which surface as malformed responses).

use super::{LayoutModel, LayoutRequest, ModelResponse};
use crate::error::LayoutError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// MIME type requested for every reply.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Caller-owned Gemini client. Cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    name: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for `model`. `timeout_secs == 0` disables the HTTP timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LayoutError> {
        let mut builder = reqwest::Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let http = builder
            .build()
            .map_err(|e| LayoutError::Internal(format!("HTTP client: {e}")))?;

        let model = model.into();
        Ok(Self {
            http,
            api_key: api_key.into(),
            name: format!("gemini/{model}"),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    pub fn from_env(model: &str, timeout_secs: u64) -> Result<Self, LayoutError> {
        let key = ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .ok_or_else(|| LayoutError::ProviderNotConfigured {
                provider: "gemini".to_string(),
                hint: "Set GEMINI_API_KEY (or GOOGLE_API_KEY), or choose another provider."
                    .to_string(),
            })?;
        Self::new(key, model, timeout_secs)
    }

    /// Point the client at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LayoutModel for GeminiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &LayoutRequest<'_>) -> Result<ModelResponse, LayoutError> {
        let page = request.page_number;
        let transport = |message: String| LayoutError::Transport { page, message };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    transport(format!("request timed out: {e}"))
                } else {
                    transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport(format!("HTTP {status}: {}", truncate(&body, 500))));
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| transport(format!("unreadable response envelope: {e}")))?;

        let out = into_model_response(envelope, page)?;
        debug!(
            "Page {}: {} input tokens, {} output tokens",
            page, out.input_tokens, out.output_tokens
        );
        Ok(out)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

fn build_request_body<'a>(request: &LayoutRequest<'a>) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Text {
                    text: request.instruction,
                },
                Part::InlineData {
                    inline_data: Blob {
                        mime_type: request.mime_type,
                        data: request.image_base64,
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE,
            response_schema: request.response_schema,
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        },
    }
}

/// Concatenate the first candidate's text parts.
fn into_model_response(
    envelope: GenerateContentResponse,
    page: usize,
) -> Result<ModelResponse, LayoutError> {
    let usage = envelope.usage_metadata.unwrap_or_default();
    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LayoutError::MalformedResponse {
            page,
            detail: "response contains no candidates".into(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LayoutError::MalformedResponse {
            page,
            detail: format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    Ok(ModelResponse {
        text,
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
