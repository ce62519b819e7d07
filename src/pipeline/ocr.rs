//! Mistral API client: file upload, signed URLs and the OCR endpoint.
//!
//! Each call is made exactly once. Any transport failure, non-2xx status or
//! undecodable body becomes a [`Pdf2MdError`] tagged with the [`ApiStage`]
//! it came from; nothing is retried.
//!
//! ## Endpoints
//!
//! ```text
//! POST {base}/v1/files            multipart: purpose=ocr, file=<pdf>  → { id }
//! GET  {base}/v1/files/{id}/url   ?expiry=N                           → { url }
//! POST {base}/v1/ocr              { model, document, ... }            → { pages[] }
//! ```

use crate::error::{ApiStage, Pdf2MdError};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Longest slice of an error body kept in [`Pdf2MdError::ApiStatus`].
const MAX_ERROR_BODY: usize = 512;

// ── Wire types ───────────────────────────────────────────────────────────

/// Body of `POST /v1/ocr`.
#[derive(Debug, Serialize)]
pub struct OcrRequest<'a> {
    pub model: &'a str,
    pub document: DocumentChunk<'a>,
    /// 0-indexed pages; omitted to process the whole document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<usize>>,
    pub include_image_base64: bool,
}

/// The document reference inside an [`OcrRequest`].
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentChunk<'a> {
    DocumentUrl { document_url: &'a str },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrPage {
    /// 0-indexed page number within the document.
    pub index: usize,
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<OcrImage>,
    #[serde(default)]
    pub dimensions: Option<PageDimensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrImage {
    /// Identifier used in the page Markdown, e.g. `img-0.jpeg`.
    pub id: String,
    /// Only present when the request asked for `include_image_base64`.
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDimensions {
    pub dpi: u32,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageInfo {
    pub pages_processed: u64,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

// ── Client ───────────────────────────────────────────────────────────────

/// Thin authenticated wrapper over the three Mistral endpoints we use.
pub struct MistralClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout_secs: Option<u64>,
}

impl MistralClient {
    /// Build a client for `base_url` (no trailing slash, no `/v1`).
    ///
    /// `timeout_secs` of None keeps reqwest's default (no timeout).
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, Pdf2MdError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Pdf2MdError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Upload a PDF for OCR and return its file id.
    pub async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, Pdf2MdError> {
        let stage = ApiStage::Upload;
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| Pdf2MdError::RequestFailed {
                stage,
                reason: e.to_string(),
            })?;
        let form = Form::new().text("purpose", "ocr").part("file", part);

        info!(stage = %stage, file_name, bytes = size, "Request issued");
        let req = self.http.post(self.endpoint("files")).multipart(form);
        let uploaded: UploadedFile = self.send_json(stage, req).await?;
        debug!(file_id = %uploaded.id, "File uploaded");
        Ok(uploaded.id)
    }

    /// Get a signed URL the OCR endpoint can fetch the uploaded file from.
    pub async fn signed_url(&self, file_id: &str, expiry: u32) -> Result<String, Pdf2MdError> {
        let stage = ApiStage::SignedUrl;
        let url = format!("{}?expiry={}", self.endpoint(&format!("files/{file_id}/url")), expiry);

        info!(stage = %stage, file_id, "Request issued");
        let signed: SignedUrl = self.send_json(stage, self.http.get(url)).await?;
        if signed.url.trim().is_empty() {
            return Err(Pdf2MdError::MalformedResponse {
                stage,
                detail: "empty signed URL".into(),
            });
        }
        Ok(signed.url)
    }

    /// Run OCR on a document the API can fetch at `document_url`.
    pub async fn ocr(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, Pdf2MdError> {
        let stage = ApiStage::Ocr;
        info!(stage = %stage, model = request.model, "Request issued");
        let req = self.http.post(self.endpoint("ocr")).json(request);
        self.send_json(stage, req).await
    }

    /// Send an authenticated request and decode a JSON success body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        stage: ApiStage,
        req: RequestBuilder,
    ) -> Result<T, Pdf2MdError> {
        let start = Instant::now();
        let response = req.bearer_auth(&self.api_key).send().await.map_err(|e| {
            let reason = match (e.is_timeout(), self.timeout_secs) {
                (true, Some(secs)) => format!("timed out after {secs}s"),
                _ => e.to_string(),
            };
            Pdf2MdError::RequestFailed { stage, reason }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Pdf2MdError::RequestFailed {
                stage,
                reason: format!("reading response body: {e}"),
            })?;

        info!(
            stage = %stage,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Response received"
        );

        if !status.is_success() {
            return Err(Pdf2MdError::ApiStatus {
                stage,
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| Pdf2MdError::MalformedResponse {
            stage,
            detail: e.to_string(),
        })
    }
}

/// Cut `s` to at most `max` bytes on a char boundary, marking the cut.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}
