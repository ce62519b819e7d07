//! Shared fixtures for the integration tests: a tiny PDF on disk and a
//! mocked Mistral API.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use wiremock::matchers::{
    any, body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const FILE_ID: &str = "file-abc123";

/// Exactly what the two mocked pages must render to with the default separator.
pub const TWO_PAGE_MARKDOWN: &str = "# Page 1\ntext...\n\n---\n\n# Page 2\nmore text...";

/// Write a minimal file with a PDF header. The API is mocked, so the body
/// never needs to be a real document.
pub fn write_sample_pdf(dir: &Path) -> PathBuf {
    let p = dir.join("sample.pdf");
    std::fs::write(&p, b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n").unwrap();
    p
}

pub fn two_page_response() -> Value {
    json!({
        "pages": [
            { "index": 0, "markdown": "# Page 1\ntext...", "images": [],
              "dimensions": { "dpi": 200, "height": 2200, "width": 1700 } },
            { "index": 1, "markdown": "# Page 2\nmore text...", "images": [],
              "dimensions": { "dpi": 200, "height": 2200, "width": 1700 } }
        ],
        "model": "mistral-ocr-2505-completion",
        "usage_info": { "pages_processed": 2, "doc_size_bytes": 58 }
    })
}

pub fn signed_url(server: &MockServer) -> String {
    format!("{}/signed/{FILE_ID}", server.uri())
}

/// Mount upload → signed URL → OCR, each expected exactly `times` times.
pub async fn mount_upload_flow(server: &MockServer, ocr_body: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .and(body_string_contains("name=\"purpose\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": FILE_ID,
            "object": "file",
            "purpose": "ocr",
            "filename": "sample",
            "bytes": 58
        })))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/files/{FILE_ID}/url")))
        .and(query_param("expiry", "60"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": signed_url(server) })))
        .expect(times)
        .mount(server)
        .await;

    mount_ocr(server, &signed_url(server), ResponseTemplate::new(200).set_body_json(ocr_body), times)
        .await;
}

/// Mount the OCR endpoint for `document_url`.
pub async fn mount_ocr(server: &MockServer, document_url: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/ocr"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "mistral-ocr-latest",
            "document": { "type": "document_url", "document_url": document_url }
        })))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// Fail the test (on server drop) if any request at all reaches the server.
pub async fn forbid_any_request(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
