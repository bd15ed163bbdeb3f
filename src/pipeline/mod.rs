//! Pipeline stages for layout extraction.
//!
//! Each submodule implements one transformation step so it can be tested and
//! swapped on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ infer ──▶ postprocess ──▶ elements
//! (path)    (pdfium)   (base64)   (model)   (JSON cleanup)
//! ```
//!
//! 1. [`input`]  : validate the document path and PDF magic bytes
//! 2. [`render`] : rasterise every page behind the [`render::Rasterizer`] trait
//! 3. [`encode`] : PNG-encode and base64-wrap each page image
//! 4. [`infer`]  : one model request per page; the only stage with network I/O
//! 5. [`postprocess`] : strip fences/BOM from the reply before JSON parsing

pub mod encode;
pub mod infer;
pub mod input;
pub mod postprocess;
pub mod render;
