//! Markdown rendering: turn an [`OcrResponse`] into page results and one
//! assembled document.
//!
//! Everything here is a pure function of its inputs, so the same response
//! always renders to byte-identical Markdown.

use crate::config::PageSeparator;
use crate::output::PageResult;
use crate::pipeline::ocr::{OcrImage, OcrPage, OcrResponse};
use tracing::debug;

/// Build per-page results, ordered by page index.
///
/// With `include_images`, image references are replaced by data URIs.
pub fn render_pages(response: &OcrResponse, include_images: bool) -> Vec<PageResult> {
    let mut pages: Vec<&OcrPage> = response.pages.iter().collect();
    pages.sort_by_key(|p| p.index);

    pages
        .into_iter()
        .map(|page| {
            let (markdown, images_inlined) = if include_images {
                inline_images(&page.markdown, &page.images)
            } else {
                (page.markdown.clone(), 0)
            };
            PageResult {
                page_num: page.index + 1,
                markdown,
                images_inlined,
            }
        })
        .collect()
}

/// Replace `![id](id)` references with `![id](<data URI>)`.
///
/// Returns the rewritten Markdown and the number of references replaced.
/// Images without a base64 payload are left as they are.
pub fn inline_images(markdown: &str, images: &[OcrImage]) -> (String, usize) {
    let mut out = markdown.to_string();
    let mut replaced = 0;

    for img in images {
        let Some(payload) = img.image_base64.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let placeholder = format!("![{0}]({0})", img.id);
        let hits = out.matches(&placeholder).count();
        if hits == 0 {
            continue;
        }
        let inlined = format!("![{}]({})", img.id, image_data_uri(&img.id, payload));
        out = out.replace(&placeholder, &inlined);
        replaced += hits;
    }

    if replaced > 0 {
        debug!("Inlined {} image reference(s)", replaced);
    }
    (out, replaced)
}

/// Return `payload` as a data URI, wrapping raw base64 when needed.
///
/// The MIME type is guessed from the image id's extension.
pub fn image_data_uri(id: &str, payload: &str) -> String {
    if payload.starts_with("data:") {
        return payload.to_string();
    }
    let ext = id.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    let mime = match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    format!("data:{mime};base64,{payload}")
}

/// Join page Markdown with the configured separator.
pub fn assemble_document(pages: &[PageResult], separator: &PageSeparator) -> String {
    let mut doc = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            doc.push_str(&separator.render(page.page_num));
        }
        doc.push_str(&page.markdown);
    }
    doc
}
