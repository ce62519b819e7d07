//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline and returns the Markdown in memory;
//! [`convert_to_file`] additionally writes it atomically to disk. Both make
//! a single pass with no retries: the first error ends the conversion.

use crate::config::ConversionConfig;
use crate::error::{ApiStage, Pdf2MdError};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::ocr::{DocumentChunk, MistralClient, OcrRequest};
use crate::pipeline::{postprocess, render};
use crate::progress::Stage;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file or URL to Markdown.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config`    — Conversion configuration
///
/// # Errors
/// * configuration: no API key in `config` or the environment; reported
///   before the input is touched or any request is sent
/// * input: file missing, unreadable, not a PDF, or not an http(s) URL
/// * remote service: transport failure, non-2xx status, or malformed body
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    let notify = |stage: Stage| {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage(stage);
        }
    };

    info!(input = input_str, "Starting conversion");
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(input_str);
    }

    // ── Step 1: Credential ───────────────────────────────────────────────
    let api_key = config.resolve_api_key()?;

    // ── Step 2: Resolve input ────────────────────────────────────────────
    notify(Stage::ResolvingInput);
    let resolved = input::resolve_input(input_str).await?;
    debug!("Input resolved: {}", resolved.describe());

    let client = MistralClient::new(&config.base_url, api_key, config.timeout_secs)?;

    // ── Step 3: Obtain a URL the OCR endpoint can fetch ──────────────────
    let upload_start = Instant::now();
    let document_url = match resolved {
        ResolvedInput::Remote(url) => url.to_string(),
        ResolvedInput::Local {
            file_name, bytes, ..
        } => {
            notify(Stage::Uploading);
            let file_id = client.upload_file(&file_name, bytes).await?;
            notify(Stage::SigningUrl);
            client.signed_url(&file_id, config.signed_url_expiry).await?
        }
    };
    let upload_duration_ms = upload_start.elapsed().as_millis() as u64;

    // ── Step 4: OCR ──────────────────────────────────────────────────────
    notify(Stage::RunningOcr);
    let ocr_start = Instant::now();
    let request = OcrRequest {
        model: &config.model,
        document: DocumentChunk::DocumentUrl {
            document_url: &document_url,
        },
        pages: config.pages.to_api_pages(),
        include_image_base64: config.include_images,
    };
    let response = client.ocr(&request).await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    if response.pages.is_empty() {
        return Err(Pdf2MdError::MalformedResponse {
            stage: ApiStage::Ocr,
            detail: "response contained no pages".into(),
        });
    }
    info!(
        pages = response.pages.len(),
        elapsed_ms = ocr_duration_ms,
        "OCR complete"
    );

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    notify(Stage::Assembling);
    let pages = render::render_pages(&response, config.include_images);
    let mut markdown = render::assemble_document(&pages, &config.page_separator);
    if config.tidy {
        markdown = postprocess::tidy(&markdown);
    }

    let stats = ConversionStats {
        page_count: pages.len(),
        model: response.model.clone(),
        pages_processed: response.usage_info.as_ref().map(|u| u.pages_processed),
        doc_size_bytes: response.usage_info.as_ref().and_then(|u| u.doc_size_bytes),
        upload_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        pages = stats.page_count,
        bytes = markdown.len(),
        total_ms = stats.total_duration_ms,
        "Conversion complete"
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.page_count);
    }

    Ok(ConversionOutput {
        markdown,
        pages,
        stats,
    })
}

/// Convert a PDF and write the Markdown to `output_path`.
///
/// The file only appears once the whole document is ready (temp file in the
/// same directory, then rename). The parent directory must already exist.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2MdError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(ref cb) = config.progress_callback {
        cb.on_stage(Stage::Writing);
    }
    write_atomic(path, output.markdown.as_bytes())?;
    info!(path = %path.display(), bytes = output.markdown.len(), "Markdown file written");

    Ok(output.stats)
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Pdf2MdError> {
    let fail = |source: std::io::Error| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Same mode a plain create would get: 0o666 minus the umask, or the
    // mode of the file being replaced.
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(parent).map_err(fail)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(fail)?;
    }
    tmp.write_all(contents).map_err(fail)?;
    tmp.flush().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
