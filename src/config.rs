//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder lets callers set only the
//! knobs they care about and rely on documented defaults for the rest.

use crate::error::Pdf2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the Mistral API key.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Default Mistral API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Default OCR model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mistral_pdf2md::{ConversionConfig, PageSeparator};
///
/// let config = ConversionConfig::builder()
///     .api_key("sk-test")
///     .include_images(false)
///     .page_separator(PageSeparator::Comment)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Mistral API key. If None, [`API_KEY_ENV`] is read at conversion time.
    pub api_key: Option<String>,

    /// API origin, without the `/v1` suffix. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// OCR model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Ask the API for base64 images and inline them as data URIs. Default: true.
    pub include_images: bool,

    /// Page selection forwarded to the OCR request. Default: all pages.
    pub pages: PageSelection,

    /// Separator between pages in the assembled output. Default: horizontal rule.
    pub page_separator: PageSeparator,

    /// Run the [`crate::pipeline::postprocess`] tidy pass. Default: false.
    ///
    /// Off by default so the output is exactly the page text the API returned.
    pub tidy: bool,

    /// `expiry` query parameter sent when requesting a signed URL for an
    /// uploaded file. Default: 60.
    pub signed_url_expiry: u32,

    /// Per-request timeout in seconds. None uses the HTTP client default.
    pub timeout_secs: Option<u64>,

    /// Stage events, e.g. for a spinner.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            include_images: true,
            pages: PageSelection::default(),
            page_separator: PageSeparator::default(),
            tidy: false,
            signed_url_expiry: 60,
            timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("include_images", &self.include_images)
            .field("pages", &self.pages)
            .field("page_separator", &self.page_separator)
            .field("tidy", &self.tidy)
            .field("signed_url_expiry", &self.signed_url_expiry)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the API key: explicit value first, then [`API_KEY_ENV`].
    ///
    /// Empty strings are treated as absent.
    pub fn resolve_api_key(&self) -> Result<String, Pdf2MdError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Pdf2MdError::MissingApiKey { var: API_KEY_ENV }),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn include_images(mut self, v: bool) -> Self {
        self.config.include_images = v;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn tidy(mut self, v: bool) -> Self {
        self.config.tidy = v;
        self
    }

    pub fn signed_url_expiry(mut self, expiry: u32) -> Self {
        self.config.signed_url_expiry = expiry.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The API key is not checked here; a missing key is reported by
    /// [`ConversionConfig::resolve_api_key`] when the conversion starts.
    pub fn build(mut self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &mut self.config;
        let trimmed = c.base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        c.base_url = trimmed;
        if c.model.trim().is_empty() {
            return Err(Pdf2MdError::InvalidConfig("model must not be empty".into()));
        }
        if c.timeout_secs == Some(0) {
            return Err(Pdf2MdError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        match &c.pages {
            PageSelection::All => {}
            PageSelection::Single(0) => {
                return Err(Pdf2MdError::InvalidConfig(
                    "pages are 1-indexed, got page 0".into(),
                ));
            }
            PageSelection::Single(_) => {}
            PageSelection::Range(start, end) => {
                if *start == 0 || start > end {
                    return Err(Pdf2MdError::InvalidConfig(format!(
                        "invalid page range {start}-{end}"
                    )));
                }
            }
            PageSelection::Set(pages) => {
                if pages.is_empty() {
                    return Err(Pdf2MdError::InvalidConfig("page set is empty".into()));
                }
                if pages.contains(&0) {
                    return Err(Pdf2MdError::InvalidConfig(
                        "pages are 1-indexed, got page 0".into(),
                    ));
                }
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF the OCR endpoint should process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default). The `pages` field is omitted from the request.
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// The 0-indexed page list the OCR API expects, or None for all pages.
    ///
    /// Zero entries are dropped since pages are 1-indexed.
    pub fn to_api_pages(&self) -> Option<Vec<usize>> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => return None,
            PageSelection::Single(p) => vec![*p],
            PageSelection::Range(start, end) => ((*start).max(1)..=*end).collect(),
            PageSelection::Set(pages) => pages.clone(),
        }
        .into_iter()
        .filter(|&p| p >= 1)
        .map(|p| p - 1)
        .collect();
        indices.sort_unstable();
        indices.dedup();
        Some(indices)
    }
}

/// How to separate pages in the assembled Markdown output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Horizontal rule: "\n\n---\n\n" (default)
    #[default]
    HorizontalRule,
    /// No visible separator; pages joined with "\n\n".
    None,
    /// HTML comment with the number of the page that follows.
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}
