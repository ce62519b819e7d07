//! Input resolution: classify a user-supplied reference as a local PDF or a
//! remote URL.
//!
//! Remote URLs are not downloaded; the OCR endpoint fetches them itself.
//! Local files are read fully into memory so they can be uploaded, after a
//! `%PDF` magic-byte check that turns obviously wrong inputs into an input
//! error instead of a confusing remote one.

use crate::error::Pdf2MdError;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// The resolved input.
#[derive(Debug, Clone)]
pub enum ResolvedInput {
    /// A readable local PDF.
    Local {
        path: PathBuf,
        /// Name sent with the upload (the file stem).
        file_name: String,
        bytes: Vec<u8>,
    },
    /// An `http`/`https` URL the OCR endpoint can fetch.
    Remote(Url),
}

impl ResolvedInput {
    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            ResolvedInput::Local { path, bytes, .. } => {
                format!("{} ({} bytes)", path.display(), bytes.len())
            }
            ResolvedInput::Remote(url) => url.to_string(),
        }
    }
}

/// Parse `input` as an absolute URL, if it looks like one.
///
/// Strings without a host (plain paths, `C:\...`) are not URLs.
fn parse_url(input: &str) -> Option<Url> {
    Url::parse(input).ok().filter(|u| u.has_host())
}

/// Check if the input string is an `http`/`https` URL.
pub fn is_url(input: &str) -> bool {
    parse_url(input).is_some_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Resolve the input string to a local PDF or a remote URL.
pub async fn resolve_input(input: &str) -> Result<ResolvedInput, Pdf2MdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Pdf2MdError::InvalidInput {
            input: input.to_string(),
        });
    }

    if let Some(url) = parse_url(trimmed) {
        return match url.scheme() {
            "http" | "https" => {
                debug!(url = %url, "Resolved remote PDF");
                Ok(ResolvedInput::Remote(url))
            }
            _ => Err(Pdf2MdError::InvalidInput {
                input: input.to_string(),
            }),
        };
    }

    resolve_local(Path::new(trimmed)).await
}

/// Read a local file, validating existence, permissions and PDF magic bytes.
async fn resolve_local(path: &Path) -> Result<ResolvedInput, Pdf2MdError> {
    let path = path.to_path_buf();

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied { path });
        }
        Err(_) => return Err(Pdf2MdError::FileNotFound { path }),
    };
    if !meta.is_file() {
        return Err(Pdf2MdError::InvalidInput {
            input: path.display().to_string(),
        });
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied { path });
        }
        Err(source) => return Err(Pdf2MdError::ReadFailed { path, source }),
    };

    if !bytes.starts_with(PDF_MAGIC) {
        let magic = bytes.iter().take(PDF_MAGIC.len()).copied().collect();
        return Err(Pdf2MdError::NotAPdf { path, magic });
    }

    let file_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    debug!(path = %path.display(), bytes = bytes.len(), "Resolved local PDF");
    Ok(ResolvedInput::Local {
        path,
        file_name,
        bytes,
    })
}

/// Derive `<stem>.md` from a file path or the last segment of a URL path.
///
/// Falls back to `output.md` when the URL has no usable path segment.
pub fn default_output_name(input: &str) -> PathBuf {
    let name = match parse_url(input.trim()) {
        Some(url) => url
            .path_segments()
            .and_then(|mut segs| segs.next_back().map(str::to_string))
            .unwrap_or_default(),
        None => Path::new(input.trim())
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    };
    let stem = if stem.is_empty() { "output".to_string() } else { stem };
    PathBuf::from(format!("{stem}.md"))
}
