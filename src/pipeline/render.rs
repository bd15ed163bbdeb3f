//! PDF rasterisation: render every page to a `DynamicImage`.
//!
//! [`Rasterizer`] is the seam between the pipeline and the rendering engine.
//! The production implementation, [`PdfiumRasterizer`], wraps pdfium; tests
//! and callers with their own renderer can plug in anything that returns
//! page images in document order.
//!
//! Rendering is blocking and CPU-bound. The orchestrator calls it from
//! `tokio::task::spawn_blocking`, since pdfium keeps thread-local state and
//! must not run on a Tokio worker thread.
//!
//! The longest edge is capped by `max_rendered_pixels` rather than derived
//! from DPI, which keeps memory bounded on oversized pages.

use crate::config::ExtractionConfig;
use crate::error::LayoutError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Converts a PDF file into ordered page images.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `pdf_path`, index 0 first.
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, LayoutError>;
}

/// pdfium-backed [`Rasterizer`].
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    max_rendered_pixels: u32,
    password: Option<String>,
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(max_rendered_pixels: u32) -> Self {
        Self {
            max_rendered_pixels,
            password: None,
            library_path: None,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_rendered_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
            library_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Load pdfium from this exact file instead of the auto-managed copy.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    fn bind(&self) -> Result<Pdfium, LayoutError> {
        let bound = match self.library_path {
            Some(ref p) => pdfium_auto::bind_pdfium_from_path(p),
            None => pdfium_auto::bind_pdfium_silent(),
        };
        bound.map_err(|e| LayoutError::PdfiumBindingFailed(e.to_string()))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, LayoutError> {
        let pdfium = self.bind()?;
        let password = self.password.as_deref();

        let document = pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| classify_load_error(pdf_path, password.is_some(), format!("{:?}", e)))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_rendered_pixels as i32)
            .set_maximum_height(self.max_rendered_pixels as i32);

        let mut images = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                LayoutError::RasterisationFailed {
                    page: idx,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

/// Map a pdfium load failure onto the password / corruption variants.
fn classify_load_error(pdf_path: &Path, had_password: bool, detail: String) -> LayoutError {
    let path = pdf_path.to_path_buf();
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            LayoutError::WrongPassword { path }
        } else {
            LayoutError::PasswordRequired { path }
        }
    } else {
        LayoutError::CorruptPdf { path, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_errors_are_classified() {
        let p = Path::new("secret.pdf");
        assert!(matches!(
            classify_load_error(p, false, "PdfiumLibraryInternalError(PasswordError)".into()),
            LayoutError::PasswordRequired { .. }
        ));
        assert!(matches!(
            classify_load_error(p, true, "PdfiumLibraryInternalError(PasswordError)".into()),
            LayoutError::WrongPassword { .. }
        ));
        assert!(matches!(
            classify_load_error(p, false, "FormatError".into()),
            LayoutError::CorruptPdf { .. }
        ));
    }

    #[test]
    fn config_carries_password_and_size() {
        let config = ExtractionConfig::builder()
            .password("pw")
            .max_rendered_pixels(1500)
            .build()
            .unwrap();
        let r = PdfiumRasterizer::from_config(&config);
        assert_eq!(r.max_rendered_pixels, 1500);
        assert_eq!(r.password.as_deref(), Some("pw"));
    }

    #[test]
    fn builder_methods_override_defaults() {
        let r = PdfiumRasterizer::new(800)
            .with_password("secret")
            .with_library_path("/opt/pdfium/libpdfium.so");
        assert_eq!(r.max_rendered_pixels, 800);
        assert_eq!(r.password.as_deref(), Some("secret"));
        assert_eq!(
            r.library_path.as_deref(),
            Some(Path::new("/opt/pdfium/libpdfium.so"))
        );
    }

    #[test]
    fn explicit_library_path_is_used_for_binding() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("libpdfium-missing.so");
        let r = PdfiumRasterizer::new(800).with_library_path(missing.clone());

        let err = r.rasterize(Path::new("never-opened.pdf")).unwrap_err();
        assert!(matches!(err, LayoutError::PdfiumBindingFailed(_)), "{err:?}");
        assert_eq!(err.kind(), crate::error::ErrorKind::Render);
    }
}
