//! CLI binary for mistral-pdf2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, prints results and turns errors into exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mistral_pdf2md::{
    convert, convert_to_file, default_output_name, write_atomic, ConversionConfig,
    ConversionProgressCallback, PageSelection, PageSeparator, Pdf2MdError, ProgressCallback,
    Stage, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr showing the current pipeline stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("pdf2md");
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_conversion_complete(&self, page_count: usize) {
        self.bar
            .println(format!("  {} OCR returned {page_count} pages", green("✓")));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Local file to stdout
  pdf2md document.pdf

  # Convert to file
  pdf2md document.pdf -o output.md

  # Convert from URL, naming the output after the URL (1706.03762.md)
  pdf2md https://arxiv.org/pdf/1706.03762 --auto-output

  # Selected pages, no inline images, page-number comments between pages
  pdf2md --pages 1-5 --no-inline-images --separator comment paper.pdf -o paper.md

  # JSON output with per-page results and usage figures
  pdf2md --json document.pdf > output.json

EXIT CODES:
  0  success
  2  configuration error (missing API key, bad flag value)
  3  input error (file missing, unreadable, not a PDF, bad URL)
  4  remote service error (HTTP failure, non-2xx status, malformed body)
  5  output error (cannot create or write the output file)

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY         Mistral API key (required unless --api-key)
  MISTRAL_API_BASE_URL    Override the API origin
  MISTRAL_OCR_MODEL       Override the OCR model
  PDF2MD_INPUT            Default input path or URL
  PDF2MD_OUTPUT           Default output path
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Convert PDF files and URLs to Markdown using the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert PDF files and URLs to Markdown using the Mistral OCR API",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(env = "PDF2MD_INPUT")]
    input: String,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "PDF2MD_OUTPUT", conflicts_with = "auto_output")]
    output: Option<PathBuf>,

    /// Write to <input stem>.md in the current directory.
    #[arg(long)]
    auto_output: bool,

    /// Mistral API key. Defaults to MISTRAL_API_KEY.
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// OCR model ID.
    #[arg(long, env = "MISTRAL_OCR_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API origin (without /v1).
    #[arg(long, env = "MISTRAL_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Inline images as base64 data URLs (default).
    #[arg(long, overrides_with = "no_inline_images")]
    inline_images: bool,

    /// Keep image references as returned by the API.
    #[arg(long, overrides_with = "inline_images")]
    no_inline_images: bool,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Page separator: hr, none, comment, or custom string.
    #[arg(long, default_value = "hr")]
    separator: String,

    /// Normalise whitespace and line endings in the output.
    #[arg(long)]
    tidy: bool,

    /// Per-request timeout in seconds (default: none).
    #[arg(long)]
    timeout: Option<u64>,

    /// Output structured JSON (ConversionOutput) on stdout instead of Markdown.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs on a terminal; -v always shows them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose && io::stderr().is_terminal();
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
        .with_ansi(io::stderr().is_terminal())
        .init();

    let spinner = show_progress.then(CliProgressCallback::new);
    let result = run(&cli, spinner.clone().map(|s| s as ProgressCallback)).await;
    if let Some(ref s) = spinner {
        s.clear();
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .chain()
                .find_map(|e| e.downcast_ref::<Pdf2MdError>())
                .map(Pdf2MdError::kind);
            match kind {
                Some(kind) => error!(kind = %kind, "{err:#}"),
                None => error!("{err:#}"),
            }
            ExitCode::from(kind.map_or(1, |k| k.exit_code()))
        }
    }
}

async fn run(cli: &Cli, progress: Option<ProgressCallback>) -> Result<()> {
    let config = build_config(cli, progress)?;

    let output_path = if cli.auto_output {
        Some(default_output_name(&cli.input))
    } else {
        cli.output.clone()
    };

    match (output_path, cli.json) {
        (Some(path), false) => {
            let stats = convert_to_file(&cli.input, &path, &config)
                .await
                .context("Conversion failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} pages  {}ms  →  {}",
                    green("✔"),
                    stats.page_count,
                    stats.total_duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        (path, json) => {
            let output = convert(&cli.input, &config)
                .await
                .context("Conversion failed")?;

            if let Some(ref path) = path {
                write_atomic(path, output.markdown.as_bytes()).context("Failed to write output")?;
            }

            let mut body = if json {
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?
            } else {
                output.markdown.clone()
            };
            if !body.ends_with('\n') {
                body.push('\n');
            }
            write_stdout(body.as_bytes())?;

            if !cli.quiet {
                eprintln!(
                    "{}",
                    dim(&format!(
                        "Converted {} pages in {}ms",
                        output.stats.page_count, output.stats.total_duration_ms
                    ))
                );
            }
        }
    }

    Ok(())
}

/// Write the whole document to stdout. Failures are output errors (exit 5).
fn write_stdout(bytes: &[u8]) -> Result<(), Pdf2MdError> {
    let fail = |source| Pdf2MdError::OutputWriteFailed {
        path: PathBuf::from("<stdout>"),
        source,
    };
    let mut handle = io::stdout().lock();
    handle.write_all(bytes).map_err(fail)?;
    handle.flush().map_err(fail)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages).map_err(|e| Pdf2MdError::InvalidConfig(format!("{e:#}")))?;
    let separator = parse_separator(&cli.separator);

    let mut builder = ConversionConfig::builder()
        .base_url(&cli.base_url)
        .model(&cli.model)
        .include_images(!cli.no_inline_images)
        .pages(pages)
        .page_separator(separator)
        .tidy(cli.tidy)
        .timeout_secs(cli.timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    let page = |p: &str| -> Result<usize> {
        let n: usize = p
            .trim()
            .parse()
            .with_context(|| format!("Invalid page number: '{}'", p.trim()))?;
        if n < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {n})");
        }
        Ok(n)
    };

    if let Some((start, end)) = s.split_once('-') {
        let (start, end) = (page(start)?, page(end)?);
        if start > end {
            anyhow::bail!("Invalid page range '{start}-{end}': start must be <= end");
        }
        return Ok(PageSelection::Range(start, end));
    }

    if s.contains(',') {
        let pages = s.split(',').map(page).collect::<Result<Vec<_>>>()?;
        return Ok(PageSelection::Set(pages));
    }

    Ok(PageSelection::Single(page(&s)?))
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "hr" | "---" => PageSeparator::HorizontalRule,
        "none" => PageSeparator::None,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
