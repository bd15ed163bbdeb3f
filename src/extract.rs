//! Pipeline orchestration: path → page images → layout elements.
//!
//! A run moves one [`PipelineState`] through three stages:
//!
//! ```text
//! Initialized ──load_pages──▶ Rasterized ──find_layout_items──▶ Completed
//! ```
//!
//! Transitions are one-directional. Any failure aborts the run and leaves
//! `elements` empty; there is no partial-result path.
//!
//! Pages are rasterised and encoded sequentially on a blocking thread.
//! Inference fans out over at most `concurrency` in-flight requests (each
//! page is independent) and the results are re-sorted by page number, so
//! output order never depends on completion order.

use crate::config::ExtractionConfig;
use crate::error::LayoutError;
use crate::model::{resolve_model, LayoutModel};
use crate::output::{ExtractionOutput, ExtractionStats, LayoutElement, PageSummary};
use crate::pipeline::encode::EncodedPage;
use crate::pipeline::infer::{InferenceClient, PageExtraction};
use crate::pipeline::input;
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Where a [`PipelineState`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Document path set, nothing loaded.
    Initialized,
    /// `pages` populated.
    Rasterized,
    /// `elements` populated.
    Completed,
}

/// Per-document working state, owned by one run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    document_path: PathBuf,
    stage: PipelineStage,
    pages: Vec<EncodedPage>,
    elements: Vec<LayoutElement>,
    page_summaries: Vec<PageSummary>,
}

impl PipelineState {
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            stage: PipelineStage::Initialized,
            pages: Vec::new(),
            elements: Vec::new(),
            page_summaries: Vec::new(),
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Encoded pages, index = page number.
    pub fn pages(&self) -> &[EncodedPage] {
        &self.pages
    }

    /// Elements in page order, then model order.
    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    pub fn page_summaries(&self) -> &[PageSummary] {
        &self.page_summaries
    }

    pub fn into_elements(self) -> Vec<LayoutElement> {
        self.elements
    }

    fn expect_stage(&self, expected: PipelineStage) -> Result<(), LayoutError> {
        if self.stage != expected {
            return Err(LayoutError::InvalidStage {
                expected,
                found: self.stage,
            });
        }
        Ok(())
    }
}

/// Drives documents through rasterisation and layout inference.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf_layout::{ExtractionConfig, GeminiClient, LayoutParser};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let model = Arc::new(GeminiClient::from_env(&config.model, config.request_timeout_secs)?);
/// let parser = LayoutParser::new(model, config);
///
/// let output = parser.parse("report.pdf").await?;
/// for el in &output.elements {
///     println!("p{} {}: {}", el.page_number, el.element_type, el.summary);
/// }
/// # Ok(())
/// # }
/// ```
pub struct LayoutParser {
    client: InferenceClient,
    rasterizer: Arc<dyn Rasterizer>,
    config: ExtractionConfig,
}

impl LayoutParser {
    /// Build a parser around a caller-owned model client, rendering with pdfium.
    pub fn new(model: Arc<dyn LayoutModel>, config: ExtractionConfig) -> Self {
        Self {
            client: InferenceClient::new(model, &config),
            rasterizer: Arc::new(PdfiumRasterizer::from_config(&config)),
            config,
        }
    }

    /// Replace the pdfium rasteriser.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// `Initialized → Rasterized`: validate the path, render and encode every page.
    pub async fn load_pages(&self, state: &mut PipelineState) -> Result<(), LayoutError> {
        state.expect_stage(PipelineStage::Initialized)?;

        let path = input::resolve_document(&state.document_path)?;
        let rasterizer = Arc::clone(&self.rasterizer);

        let pages = tokio::task::spawn_blocking(move || rasterize_and_encode(rasterizer.as_ref(), &path))
            .await
            .map_err(|e| LayoutError::Internal(format!("Render task panicked: {}", e)))??;

        info!("Rasterized {} pages", pages.len());
        state.pages = pages;
        state.stage = PipelineStage::Rasterized;
        Ok(())
    }

    /// `Rasterized → Completed`: infer every page and collect elements in page order.
    pub async fn find_layout_items(&self, state: &mut PipelineState) -> Result<(), LayoutError> {
        state.expect_stage(PipelineStage::Rasterized)?;

        let total = state.pages.len();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_start(total);
        }

        let mut results: Vec<PageExtraction> = stream::iter(
            state
                .pages
                .iter()
                .map(|page| self.infer_one(page, total)),
        )
        .buffer_unordered(self.config.concurrency)
        .try_collect()
        .await?;

        results.sort_by_key(|r| r.summary.page_number);

        let mut elements = Vec::new();
        let mut summaries = Vec::with_capacity(results.len());
        for result in results {
            elements.extend(result.elements);
            summaries.push(result.summary);
        }

        info!("Total layout elements extracted: {}", elements.len());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_complete(total, elements.len());
        }

        state.elements = elements;
        state.page_summaries = summaries;
        state.stage = PipelineStage::Completed;
        Ok(())
    }

    /// Run the whole pipeline on one document.
    pub async fn parse(&self, document_path: impl AsRef<Path>) -> Result<ExtractionOutput, LayoutError> {
        let total_start = Instant::now();
        let mut state = PipelineState::new(document_path.as_ref());
        info!(
            "Starting layout extraction: {} (model {})",
            state.document_path.display(),
            self.client.model_name()
        );

        let render_start = Instant::now();
        self.load_pages(&mut state).await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        let infer_start = Instant::now();
        self.find_layout_items(&mut state).await?;
        let inference_duration_ms = infer_start.elapsed().as_millis() as u64;

        let stats = ExtractionStats {
            total_pages: state.pages.len(),
            total_elements: state.elements.len(),
            total_input_tokens: state.page_summaries.iter().map(|p| p.input_tokens).sum(),
            total_output_tokens: state.page_summaries.iter().map(|p| p.output_tokens).sum(),
            render_duration_ms,
            inference_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {} elements from {} pages, {}ms total",
            stats.total_elements, stats.total_pages, stats.total_duration_ms
        );

        Ok(ExtractionOutput {
            elements: state.elements,
            pages: state.page_summaries,
            stats,
        })
    }

    async fn infer_one(&self, page: &EncodedPage, total: usize) -> Result<PageExtraction, LayoutError> {
        let cb = self.config.progress_callback.as_ref();
        info!("Processing page {}/{}", page.page_number + 1, total);
        if let Some(cb) = cb {
            cb.on_page_start(page.page_number, total);
        }

        match self.client.infer_page(&page.base64_png, page.page_number).await {
            Ok(result) => {
                info!(
                    "Extracted {} layout elements from page {}.",
                    result.elements.len(),
                    page.page_number + 1
                );
                if let Some(cb) = cb {
                    cb.on_page_complete(page.page_number, total, result.elements.len());
                }
                Ok(result)
            }
            Err(e) => {
                if let Some(cb) = cb {
                    cb.on_page_error(page.page_number, total, &e.to_string());
                }
                Err(e)
            }
        }
    }
}

/// Blocking half of `load_pages`.
fn rasterize_and_encode(
    rasterizer: &dyn Rasterizer,
    path: &Path,
) -> Result<Vec<EncodedPage>, LayoutError> {
    let images = rasterizer.rasterize(path)?;
    if images.is_empty() {
        return Err(LayoutError::EmptyDocument {
            path: path.to_path_buf(),
        });
    }

    images
        .iter()
        .enumerate()
        .map(|(idx, img)| {
            let page = EncodedPage::new(idx, img).map_err(|e| LayoutError::EncodingFailed {
                page: idx,
                detail: e.to_string(),
            })?;
            debug!("Encoded page {} ({}x{})", idx + 1, page.width, page.height);
            Ok(page)
        })
        .collect()
}

/// Extract layout elements from a PDF, resolving the model from `config`
/// and the environment.
///
/// Use [`LayoutParser`] directly to supply your own model client or rasteriser.
pub async fn extract(
    document_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, LayoutError> {
    let model = resolve_model(config)?;
    LayoutParser::new(model, config.clone())
        .parse(document_path)
        .await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    document_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, LayoutError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| LayoutError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(document_path, config))
}
