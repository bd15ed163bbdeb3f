//! Layout inference: one model request per page, reply parsed into elements.
//!
//! The client owns everything that is identical across pages (instruction,
//! normalized schema, generation options) so a page call only adds the
//! image. It sends each request once. Retry policy belongs to the caller.

use crate::config::ExtractionConfig;
use crate::error::LayoutError;
use crate::model::{LayoutModel, LayoutRequest};
use crate::output::{ElementType, LayoutElement, PageSummary};
use crate::pipeline::encode::PAGE_MIME_TYPE;
use crate::pipeline::postprocess::clean_json_payload;
use crate::prompts::layout_instruction;
use crate::schema::{layout_elements_schema, normalize, to_json_schema};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Reply payload, as constrained by [`layout_elements_schema`].
#[derive(Debug, Deserialize)]
struct LayoutItems {
    layout_items: Vec<DetectedLayoutItem>,
}

#[derive(Debug, Deserialize)]
struct DetectedLayoutItem {
    element_type: ElementType,
    summary: String,
}

/// Elements and accounting for a single page.
#[derive(Debug, Clone)]
pub struct PageExtraction {
    pub elements: Vec<LayoutElement>,
    pub summary: PageSummary,
}

/// Sends page requests to a [`LayoutModel`] and parses the replies.
pub struct InferenceClient {
    model: Arc<dyn LayoutModel>,
    instruction: String,
    response_schema: Value,
    max_items: usize,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl InferenceClient {
    pub fn new(model: Arc<dyn LayoutModel>, config: &ExtractionConfig) -> Self {
        let schema = layout_elements_schema(config.max_items_per_page);
        let instruction = match config.instruction {
            Some(ref text) => text.clone(),
            None => layout_instruction(&to_json_schema(&schema).to_string(), config.max_items_per_page),
        };
        let response_schema = normalize(&schema);
        debug!("Using response schema: {}", response_schema);

        Self {
            model,
            instruction,
            response_schema,
            max_items: config.max_items_per_page,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn response_schema(&self) -> &Value {
        &self.response_schema
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Detect the layout elements of one encoded page.
    pub async fn infer_page(
        &self,
        image_base64: &str,
        page_number: usize,
    ) -> Result<PageExtraction, LayoutError> {
        let start = Instant::now();
        let request = LayoutRequest {
            page_number,
            instruction: &self.instruction,
            image_base64,
            mime_type: PAGE_MIME_TYPE,
            response_schema: &self.response_schema,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        let response = self.model.generate(&request).await?;
        let elements = parse_layout_items(&response.text, page_number)?;

        if elements.len() > self.max_items {
            warn!(
                "Page {}: model returned {} items (limit {})",
                page_number + 1,
                elements.len(),
                self.max_items
            );
        }

        Ok(PageExtraction {
            summary: PageSummary {
                page_number,
                element_count: elements.len(),
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                duration_ms: start.elapsed().as_millis() as u64,
            },
            elements,
        })
    }
}

/// Parse a reply payload into elements tagged with `page_number`.
///
/// Fails with [`LayoutError::MalformedResponse`] when the text is not JSON,
/// lacks `layout_items` / `element_type` / `summary`, or names an unknown
/// element type.
pub fn parse_layout_items(text: &str, page_number: usize) -> Result<Vec<LayoutElement>, LayoutError> {
    let cleaned = clean_json_payload(text);
    let data: LayoutItems =
        serde_json::from_str(&cleaned).map_err(|e| LayoutError::MalformedResponse {
            page: page_number,
            detail: e.to_string(),
        })?;

    Ok(data
        .layout_items
        .into_iter()
        .map(|item| LayoutElement {
            element_type: item.element_type,
            summary: item.summary,
            page_number,
        })
        .collect())
}
