//! Input validation: make sure the document path names a readable PDF.
//!
//! Runs before the rasteriser so that a bad path is reported as an input
//! error without touching pdfium or issuing any model request. The `%PDF`
//! magic-byte check turns "wrong file" into a meaningful error rather than a
//! pdfium load failure.

use crate::error::LayoutError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate `path` and return it as an owned `PathBuf`.
pub fn resolve_document(path: &Path) -> Result<PathBuf, LayoutError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(LayoutError::FileNotFound { path });
    }
    if !path.is_file() {
        return Err(LayoutError::NotAFile { path });
    }

    match File::open(&path) {
        Ok(f) => {
            let mut head = Vec::with_capacity(4);
            if let Err(e) = f.take(4).read_to_end(&mut head) {
                return Err(LayoutError::CorruptPdf {
                    path,
                    detail: format!("cannot read header: {e}"),
                });
            }
            // Files shorter than the magic are padded with zeros.
            let mut magic = [0u8; 4];
            magic[..head.len()].copy_from_slice(&head);
            if &magic != b"%PDF" {
                return Err(LayoutError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(LayoutError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(LayoutError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
