//! # edgequake-pdf-layout
//!
//! Find the tables, figures, images and text blocks on every page of a PDF
//! using a multimodal model.
//!
//! Each page is rasterised to a PNG and sent to the model together with a
//! response schema. Gemini enforces the schema through constrained decoding;
//! other providers receive it in the instruction. The JSON reply is parsed
//! into an ordered list of [`LayoutElement`]s.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   validate path + %PDF magic bytes
//!  ├─ 2. Render  rasterise pages via pdfium (spawn_blocking)
//!  ├─ 3. Encode  PNG → base64
//!  ├─ 4. Infer   one schema-constrained request per page (bounded concurrency)
//!  └─ 5. Output  elements in page order + per-page token stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_layout::{extract, ElementType, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini by default; reads GEMINI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let output = extract("document.pdf", &config).await?;
//!     for table in output.elements_of_type(ElementType::Table) {
//!         println!("page {}: {}", table.page_number, table.summary);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2layout` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_MAX_ITEMS_PER_PAGE, DEFAULT_MODEL};
pub use error::{ErrorKind, LayoutError};
pub use extract::{extract, extract_sync, LayoutParser, PipelineStage, PipelineState};
pub use model::{resolve_model, GeminiClient, LayoutModel, LayoutRequest, ModelResponse, ProviderModel};
pub use output::{ElementMetadata, ElementType, ExtractionOutput, ExtractionStats, LayoutElement, PageSummary};
pub use pipeline::encode::{decode_page, encode_page, EncodedPage};
pub use pipeline::infer::InferenceClient;
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use schema::{layout_elements_schema, normalize, Field, SchemaNode};
