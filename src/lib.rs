//! # mistral-pdf2md
//!
//! Convert PDF documents to Markdown with the Mistral OCR API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (path or URL)
//!  │
//!  ├─ 1. Key     resolve the API key (config, then MISTRAL_API_KEY)
//!  ├─ 2. Input   read + check a local PDF, or accept an http(s) URL as is
//!  ├─ 3. Upload  local files only: POST /v1/files, then a signed URL
//!  ├─ 4. OCR     POST /v1/ocr → per-page Markdown
//!  ├─ 5. Render  inline images, join pages with a separator
//!  └─ 6. Output  Markdown in memory, or written atomically to a file
//! ```
//!
//! Every step runs once, in order. Any failure aborts the conversion and no
//! output file is written.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistral_pdf2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from MISTRAL_API_KEY
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, PageSelection, PageSeparator, API_KEY_ENV,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use convert::{convert, convert_to_file, write_atomic};
pub use error::{ApiStage, ErrorKind, Pdf2MdError};
pub use output::{ConversionOutput, ConversionStats, PageResult};
pub use pipeline::input::default_output_name;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
