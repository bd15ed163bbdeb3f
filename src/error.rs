//! Error types for the edgequake-pdf-layout library.
//!
//! Every failure is fatal for the current document: a page that cannot be
//! rendered, a model call that fails, or a reply that does not match the
//! response schema aborts the whole run and surfaces as a [`LayoutError`].
//! No partial element list is returned.
//!
//! Variants are grouped by the pipeline stage that raises them.
//! [`LayoutError::kind`] folds them into the coarse [`ErrorKind`] taxonomy
//! callers usually branch on (bad input vs. transport vs. schema violation).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf-layout library.
#[derive(Debug, Error)]
pub enum LayoutError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Rasterisation produced no pages.
    #[error("No pages could be rendered from '{path}'")]
    EmptyDocument { path: PathBuf },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Render errors ─────────────────────────────────────────────────────
    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// PNG/base64 encoding of a rendered page failed.
    #[error("Image encoding failed for page {page}: {detail}")]
    EncodingFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model request could not be completed (network or service fault).
    #[error("Model request failed on page {page}: {message}")]
    Transport { page: usize, message: String },

    /// The model replied, but the payload is not valid JSON or does not match
    /// the layout schema.
    #[error("Malformed model response on page {page}: {detail}")]
    MalformedResponse { page: usize, detail: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("Model provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config / usage errors ─────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pipeline operation was called out of order.
    #[error("Pipeline is in stage {found:?}, expected {expected:?}")]
    InvalidStage {
        expected: crate::extract::PipelineStage,
        found: crate::extract::PipelineStage,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`LayoutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/invalid document, or no pages could be extracted.
    Input,
    /// Rasterisation, encoding, or pdfium binding failed.
    Render,
    /// The model request failed.
    Transport,
    /// The model reply did not conform to the layout schema.
    SchemaViolation,
    /// Invalid configuration or API misuse.
    Config,
    /// Anything else.
    Internal,
}

impl LayoutError {
    /// Which stage of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use LayoutError::*;
        match self {
            FileNotFound { .. }
            | NotAFile { .. }
            | PermissionDenied { .. }
            | NotAPdf { .. }
            | EmptyDocument { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. } => ErrorKind::Input,
            RasterisationFailed { .. } | EncodingFailed { .. } | PdfiumBindingFailed(_) => {
                ErrorKind::Render
            }
            Transport { .. } => ErrorKind::Transport,
            MalformedResponse { .. } => ErrorKind::SchemaViolation,
            ProviderNotConfigured { .. } | InvalidConfig(_) | InvalidStage { .. } => {
                ErrorKind::Config
            }
            Internal(_) => ErrorKind::Internal,
        }
    }

    /// Zero-based page the error is attached to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            LayoutError::RasterisationFailed { page, .. }
            | LayoutError::EncodingFailed { page, .. }
            | LayoutError::Transport { page, .. }
            | LayoutError::MalformedResponse { page, .. } => Some(*page),
            _ => None,
        }
    }
}
