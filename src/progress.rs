//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline infers each page.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_layout::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ElementCounter {
//!     elements: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for ElementCounter {
//!     fn on_page_complete(&self, page_number: usize, total_pages: usize, element_count: usize) {
//!         self.elements.fetch_add(element_count, Ordering::SeqCst);
//!         eprintln!("page {}/{}: {} elements", page_number + 1, total_pages, element_count);
//!     }
//! }
//!
//! let counter = Arc::new(ElementCounter { elements: AtomicUsize::new(0) });
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// Page numbers are zero-based, matching [`crate::LayoutElement::page_number`].
/// With `concurrency > 1` the page methods may be called concurrently and
/// out of page order; protect shared state accordingly. All methods default
/// to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after rasterisation, before the first model request.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before the model request for a page is sent.
    fn on_page_start(&self, page_number: usize, total_pages: usize) {
        let _ = (page_number, total_pages);
    }

    /// Called when a page's reply has been parsed.
    fn on_page_complete(&self, page_number: usize, total_pages: usize, element_count: usize) {
        let _ = (page_number, total_pages, element_count);
    }

    /// Called when a page fails. The run aborts after this.
    fn on_page_error(&self, page_number: usize, total_pages: usize, error: &str) {
        let _ = (page_number, total_pages, error);
    }

    /// Called once after every page succeeded.
    fn on_extraction_complete(&self, total_pages: usize, total_elements: usize) {
        let _ = (total_pages, total_elements);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        elements: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_number: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_number: usize, _total_pages: usize, element_count: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.elements.fetch_add(element_count, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_number: usize, _total_pages: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(2);
        cb.on_page_start(0, 2);
        cb.on_page_complete(0, 2, 3);
        cb.on_page_error(1, 2, "boom");
        cb.on_extraction_complete(2, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_start(0, 2);
        tracker.on_page_complete(0, 2, 4);
        tracker.on_page_start(1, 2);
        tracker.on_page_error(1, 2, "malformed");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.elements.load(Ordering::SeqCst), 4);
    }
}
