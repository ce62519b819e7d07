//! Result types returned by a conversion.

use serde::{Deserialize, Serialize};

/// The assembled document plus per-page detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The final Markdown document.
    pub markdown: String,
    /// Per-page results, ordered by page index.
    pub pages: Vec<PageResult>,
    /// Timing and usage figures.
    pub stats: ConversionStats,
}

/// Markdown for a single page, after image inlining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    pub markdown: String,
    /// Images whose reference was replaced by a data URI.
    pub images_inlined: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages returned by the OCR API.
    pub page_count: usize,
    /// Model reported by the API, if any.
    pub model: Option<String>,
    /// `usage_info.pages_processed` as reported by the API.
    pub pages_processed: Option<u64>,
    /// `usage_info.doc_size_bytes` as reported by the API.
    pub doc_size_bytes: Option<u64>,
    /// Time spent uploading and signing (local inputs only).
    pub upload_duration_ms: u64,
    /// Time spent waiting on the OCR endpoint.
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}
