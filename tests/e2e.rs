//! End-to-end tests against a real PDF, real pdfium and a live Gemini model.
//!
//! Gated behind `E2E_ENABLED` so they never run in CI unless requested.
//! The document defaults to `./test_cases/sample.pdf` and can be overridden
//! with `PDF2LAYOUT_E2E_PDF`.
//!
//! Run with:
//!   E2E_ENABLED=1 GEMINI_API_KEY=... cargo test --test e2e -- --nocapture

use edgequake_pdf_layout::{
    extract, ElementType, ExtractionConfig, GeminiClient, LayoutParser, PdfiumRasterizer,
    Rasterizer,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn sample_pdf() -> PathBuf {
    std::env::var("PDF2LAYOUT_E2E_PDF")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/sample.pdf")
        })
}

/// Skip unless E2E_ENABLED is set and the PDF at `path` exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("edgequake_pdf_layout=debug")
        .try_init();
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_rasterize_sample() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());

    let rasterizer = PdfiumRasterizer::new(1000);
    let pages = rasterizer.rasterize(&pdf).expect("rasterisation should succeed");
    assert!(!pages.is_empty());
    for (i, img) in pages.iter().enumerate() {
        let longest = img.width().max(img.height());
        assert!(longest <= 1000, "page {i} is {longest}px on its longest edge");
    }
}

#[tokio::test]
async fn test_extract_sample_with_gemini() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());
    init_tracing();

    let config = ExtractionConfig::builder()
        .concurrency(2)
        .max_rendered_pixels(1500)
        .build()
        .unwrap();

    let output = extract(&pdf, &config).await.expect("extraction should succeed");
    println!("{}", serde_json::to_string_pretty(&output).unwrap());

    assert_eq!(output.pages.len(), output.stats.total_pages);
    assert!(output.stats.total_input_tokens > 0);
    for window in output.elements.windows(2) {
        assert!(window[0].page_number <= window[1].page_number);
    }
    for el in &output.elements {
        assert!(el.page_number < output.stats.total_pages);
        assert!(!el.summary.trim().is_empty());
        assert!(ElementType::ALL.contains(&el.element_type));
    }
}

#[tokio::test]
async fn test_explicit_client_matches_convenience_entry_point() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());

    let config = ExtractionConfig::builder().max_items_per_page(3).build().unwrap();
    let client = GeminiClient::from_env(&config.model, config.request_timeout_secs)
        .expect("GEMINI_API_KEY or GOOGLE_API_KEY must be set");
    let parser = LayoutParser::new(Arc::new(client), config);

    let output = parser.parse(&pdf).await.expect("extraction should succeed");
    assert!(!output.pages.is_empty());
    assert_eq!(output.stats.total_elements, output.elements.len());
}
