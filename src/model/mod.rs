//! Model transports: how a page request reaches a vision model.
//!
//! The pipeline only knows the [`LayoutModel`] trait. A client is constructed
//! once by the caller and passed into [`crate::extract::LayoutParser`]; there
//! is no process-wide model state.
//!
//! Two implementations ship with the crate:
//!
//! | Type | Backend | Schema enforcement |
//! |------|---------|--------------------|
//! | [`GeminiClient`] | Gemini `generateContent` REST API | `responseSchema` (constrained decoding) |
//! | [`ProviderModel`] | any `edgequake-llm` provider | instruction text only |

pub mod gemini;
pub mod provider;

pub use gemini::GeminiClient;
pub use provider::ProviderModel;

use crate::config::ExtractionConfig;
use crate::error::LayoutError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// One page's worth of request data.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    /// Zero-based page index, used to tag errors.
    pub page_number: usize,
    pub instruction: &'a str,
    /// Base64 image payload.
    pub image_base64: &'a str,
    pub mime_type: &'a str,
    /// Constrained-decoding schema (see [`crate::schema::normalize`]).
    pub response_schema: &'a Value,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// Raw model reply plus token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// Reply text, expected to be a JSON document.
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A multimodal model that answers one page request with JSON text.
///
/// Implementations send exactly one request per call. Retrying, backing off
/// and rate-limiting are left to the caller.
#[async_trait]
pub trait LayoutModel: Send + Sync {
    /// Short name for logs, e.g. `"gemini/gemini-2.0-flash"`.
    fn name(&self) -> &str;

    /// Send the request and return the reply text.
    ///
    /// Network or service faults map to [`LayoutError::Transport`].
    async fn generate(&self, request: &LayoutRequest<'_>) -> Result<ModelResponse, LayoutError>;
}

/// Build the model client named by `config`.
///
/// `provider_name` of `None`, `"gemini"` or `"google"` selects the native
/// [`GeminiClient`] (API key from `GEMINI_API_KEY` / `GOOGLE_API_KEY`).
/// Any other name is handed to `edgequake-llm`'s provider factory, which
/// reads that provider's own API-key variable.
pub fn resolve_model(config: &ExtractionConfig) -> Result<Arc<dyn LayoutModel>, LayoutError> {
    let model: Arc<dyn LayoutModel> = match config.provider_name.as_deref() {
        None | Some("gemini") | Some("google") => Arc::new(GeminiClient::from_env(
            &config.model,
            config.request_timeout_secs,
        )?),
        Some(name) => Arc::new(ProviderModel::from_factory(name, &config.model)?),
    };
    info!("Using model {}", model.name());
    Ok(model)
}

