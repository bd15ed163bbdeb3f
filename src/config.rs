//! Configuration types for layout extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Credentials are not part of the
//! config: the model client is constructed by the caller (or resolved from
//! the environment by [`crate::model::resolve_model`]) and handed to
//! [`crate::extract::LayoutParser`].

use crate::error::LayoutError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default Gemini model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default upper bound on layout items accepted per page.
pub const DEFAULT_MAX_ITEMS_PER_PAGE: usize = 10;

/// Configuration for a layout-extraction run.
///
/// # Example
/// ```rust
/// use edgequake_pdf_layout::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .concurrency(2)
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_items_per_page, 10);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Model identifier sent with every request. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Provider name (`"gemini"`, `"openai"`, `"anthropic"`, `"ollama"`, …).
    /// `None` selects the native Gemini client with constrained decoding.
    pub provider_name: Option<String>,

    /// Longest edge of a rendered page in pixels. Default: 2000.
    ///
    /// Caps memory on oversized pages independent of physical page size.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Number of pages inferred concurrently. Default: 4.
    ///
    /// `1` processes pages strictly one after another.
    pub concurrency: usize,

    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate per page. `None` = provider default.
    pub max_output_tokens: Option<u32>,

    /// Maximum layout items requested per page. Default: 10.
    pub max_items_per_page: usize,

    /// Custom instruction text. If None, uses [`crate::prompts::layout_instruction`].
    pub instruction: Option<String>,

    /// HTTP timeout for a single model request, in seconds. Default: 120.
    /// Applied by the transport, not by the pipeline.
    pub request_timeout_secs: u64,

    /// Receives per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            max_rendered_pixels: 2000,
            password: None,
            concurrency: 4,
            temperature: None,
            max_output_tokens: None,
            max_items_per_page: DEFAULT_MAX_ITEMS_PER_PAGE,
            instruction: None,
            request_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("concurrency", &self.concurrency)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_items_per_page", &self.max_items_per_page)
            .field("instruction", &self.instruction.as_ref().map(|s| s.len()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn max_items_per_page(mut self, n: usize) -> Self {
        self.config.max_items_per_page = n;
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, LayoutError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(LayoutError::InvalidConfig("Model identifier must not be empty".into()));
        }
        if c.max_items_per_page == 0 || c.max_items_per_page > 100 {
            return Err(LayoutError::InvalidConfig(format!(
                "max_items_per_page must be 1–100, got {}",
                c.max_items_per_page
            )));
        }
        if c.concurrency == 0 {
            return Err(LayoutError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_items_per_page, 10);
        assert_eq!(c.concurrency, 4);
        assert!(c.provider_name.is_none());
    }

    #[test]
    fn builder_clamps_values() {
        let c = ExtractionConfig::builder()
            .concurrency(0)
            .max_rendered_pixels(5)
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_rendered_pixels, 100);
        assert_eq!(c.temperature, Some(2.0));
    }

    #[test]
    fn builder_rejects_zero_items() {
        let err = ExtractionConfig::builder()
            .max_items_per_page(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_model() {
        assert!(ExtractionConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
