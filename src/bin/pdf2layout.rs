//! CLI binary for edgequake-pdf-layout.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints the detected elements.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf_layout::{
    resolve_model, ExtractionConfig, ExtractionOutput, ExtractionProgressCallback, LayoutParser,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar plus one log line per page. Pages may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Rendering");
        bar.set_message("Rasterising PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Detecting");
    }

    fn on_page_complete(&self, page_number: usize, total_pages: usize, element_count: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_number + 1,
            total_pages,
            dim(&format!("{element_count} elements")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_number: usize, total_pages: usize, error: &str) {
        let msg: String = error.chars().take(80).collect();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_number + 1,
            total_pages,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_extraction_complete(&self, total_pages: usize, total_elements: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} elements from {} pages",
            green("✔"),
            bold(&total_elements.to_string()),
            total_pages
        );
    }
}

/// Detect tables, figures, images and text blocks in a PDF with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2layout",
    version,
    about = "Detect tables, figures, images and text blocks in PDF pages using vision LLMs",
    arg_required_else_help = true
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write JSON output to this file instead of stdout.
    #[arg(short, long, env = "PDF2LAYOUT_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the full JSON result (elements + stats) instead of a text listing.
    #[arg(long, env = "PDF2LAYOUT_JSON")]
    json: bool,

    /// Model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Provider: gemini (default, constrained decoding), openai, anthropic, ollama, …
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Number of pages inferred concurrently (1 = sequential).
    #[arg(short, long, env = "PDF2LAYOUT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Longest edge of a rendered page, in pixels.
    #[arg(long, env = "PDF2LAYOUT_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Maximum layout items per page.
    #[arg(long, env = "PDF2LAYOUT_MAX_ITEMS", default_value_t = 10)]
    max_items: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2LAYOUT_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom instruction.
    #[arg(long, env = "PDF2LAYOUT_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDF2LAYOUT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens per page.
    #[arg(long, env = "PDF2LAYOUT_MAX_OUTPUT_TOKENS")]
    max_output_tokens: Option<u32>,

    /// HTTP timeout per model request, in seconds (0 = none).
    #[arg(long, env = "PDF2LAYOUT_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PDF2LAYOUT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2LAYOUT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2LAYOUT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config + model ─────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;
    let model = resolve_model(&config).context("Failed to set up model provider")?;
    let parser = LayoutParser::new(model, config);

    // ── Run extraction ───────────────────────────────────────────────────
    let output = parser
        .parse(&cli.input)
        .await
        .with_context(|| format!("Layout extraction failed for {}", cli.input.display()))?;

    if let Some(ref path) = cli.output {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_listing(&output).context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        eprintln!(
            "   {} tokens in  /  {} tokens out  |  {}ms total",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// One block per element: `[page N] Type` followed by the summary.
fn print_listing(output: &ExtractionOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for el in &output.elements {
        writeln!(handle, "[page {}] {}", el.page_number + 1, el.element_type)?;
        writeln!(handle, "{}\n", el.summary)?;
    }
    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .concurrency(cli.concurrency)
        .max_rendered_pixels(cli.max_pixels)
        .max_items_per_page(cli.max_items)
        .request_timeout_secs(cli.timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        // The default model id is a Gemini id; other providers need their own.
        if cli.model.is_none() && !matches!(provider.as_str(), "gemini" | "google") {
            anyhow::bail!("--model is required with --provider {provider}");
        }
        builder = builder.provider_name(provider);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_output_tokens {
        builder = builder.max_output_tokens(n);
    }
    if let Some(ref path) = cli.instruction {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
