//! Adapter from `edgequake-llm` chat providers to [`LayoutModel`].
//!
//! Chat-completion providers have no portable decoding constraint, so the
//! response schema reaches the model only through the instruction text
//! (which embeds it as JSON Schema). Replies are cleaned by
//! [`crate::pipeline::postprocess`] before parsing.

use super::{LayoutModel, LayoutRequest, ModelResponse};
use crate::error::LayoutError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Any vision-capable `edgequake-llm` provider.
#[derive(Clone)]
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    name: String,
}

impl ProviderModel {
    /// Wrap an already-configured provider.
    pub fn new(provider: Arc<dyn LLMProvider>, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
        }
    }

    /// Create `provider_name` (`"openai"`, `"anthropic"`, `"ollama"`, …) for
    /// `model` via [`ProviderFactory`], which reads the matching API key from
    /// the environment.
    pub fn from_factory(provider_name: &str, model: &str) -> Result<Self, LayoutError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            LayoutError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, format!("{provider_name}/{model}")))
    }
}

#[async_trait]
impl LayoutModel for ProviderModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &LayoutRequest<'_>) -> Result<ModelResponse, LayoutError> {
        let image = ImageData::new(request.image_base64.to_string(), request.mime_type)
            .with_detail("high");
        let messages = vec![ChatMessage::user_with_images(request.instruction, vec![image])];

        let options = CompletionOptions {
            temperature: request.temperature,
            max_tokens: request.max_output_tokens.map(|n| n as usize),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| LayoutError::Transport {
                page: request.page_number,
                message: e.to_string(),
            })?;

        debug!(
            "Page {}: {} input tokens, {} output tokens",
            request.page_number, response.prompt_tokens, response.completion_tokens
        );

        Ok(ModelResponse {
            text: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}
