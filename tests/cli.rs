//! End-to-end tests for the `pdf2md` binary against a mocked Mistral API.
//!
//! The binary runs as a child process; the mock server lives on this side,
//! so the child is run from `spawn_blocking` to keep the runtime free.

mod common;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::process::Output;
use wiremock::{MockServer, ResponseTemplate};

/// A `pdf2md` command with a clean environment pointed at `server`.
fn pdf2md(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("pdf2md").unwrap();
    cmd.env("MISTRAL_API_KEY", API_KEY)
        .env("MISTRAL_API_BASE_URL", server.uri())
        .env_remove("MISTRAL_OCR_MODEL")
        .env_remove("PDF2MD_INPUT")
        .env_remove("PDF2MD_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn two_page_pdf_to_file() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());
    let out = dir.path().join("out.md");

    let mut cmd = pdf2md(&server);
    cmd.arg(&pdf).arg("-o").arg(&out);
    run(cmd).await.assert().success();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), TWO_PAGE_MARKDOWN);
}

#[tokio::test(flavor = "multi_thread")]
async fn stdout_gets_markdown_with_trailing_newline() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());

    let mut cmd = pdf2md(&server);
    cmd.arg(&pdf);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(format!("{TWO_PAGE_MARKDOWN}\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_api_key_fails_before_any_request() {
    let server = MockServer::start().await;
    forbid_any_request(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());
    let out = dir.path().join("out.md");

    let mut cmd = pdf2md(&server);
    cmd.env_remove("MISTRAL_API_KEY").arg(&pdf).arg("-o").arg(&out);
    run(cmd)
        .await
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MISTRAL_API_KEY"));

    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn api_key_flag_overrides_environment() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());
    let out = dir.path().join("out.md");

    let mut cmd = pdf2md(&server);
    cmd.env("MISTRAL_API_KEY", "stale-key")
        .arg("--api-key")
        .arg(API_KEY)
        .arg(&pdf)
        .arg("-o")
        .arg(&out);
    run(cmd).await.assert().success();
    assert!(out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_error_exits_nonzero_without_output() {
    let server = MockServer::start().await;
    mount_ocr(
        &server,
        "https://example.com/doc.pdf",
        ResponseTemplate::new(503).set_body_string("overloaded"),
        1,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.md");

    let mut cmd = pdf2md(&server);
    cmd.arg("https://example.com/doc.pdf").arg("-o").arg(&out);
    run(cmd)
        .await
        .assert()
        .code(4)
        .stderr(predicate::str::contains("503"))
        .stderr(predicate::str::contains("\u{1b}[").not());

    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unwritable_output_exits_with_output_error() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());
    let out = dir.path().join("no-such-dir").join("out.md");

    let mut cmd = pdf2md(&server);
    cmd.arg(&pdf).arg("-o").arg(&out);
    run(cmd).await.assert().code(5);

    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_pdf_input_exits_with_input_error() {
    let server = MockServer::start().await;
    forbid_any_request(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("readme.txt");
    std::fs::write(&txt, "hello").unwrap();

    let mut cmd = pdf2md(&server);
    cmd.arg(&txt);
    run(cmd).await.assert().code(3);

    let mut cmd = pdf2md(&server);
    cmd.arg(dir.path().join("missing.pdf"));
    run(cmd).await.assert().code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn input_falls_back_to_environment() {
    let server = MockServer::start().await;
    mount_ocr(
        &server,
        "https://example.com/default.pdf",
        ResponseTemplate::new(200).set_body_json(two_page_response()),
        1,
    )
    .await;

    let mut cmd = pdf2md(&server);
    cmd.env("PDF2MD_INPUT", "https://example.com/default.pdf");
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("# Page 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn auto_output_names_file_after_input() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());

    let mut cmd = pdf2md(&server);
    cmd.current_dir(dir.path()).arg(&pdf).arg("--auto-output");
    run(cmd).await.assert().success();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("sample.md")).unwrap(),
        TWO_PAGE_MARKDOWN
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn json_flag_prints_structured_output() {
    let server = MockServer::start().await;
    mount_upload_flow(&server, two_page_response(), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_sample_pdf(dir.path());

    let mut cmd = pdf2md(&server);
    cmd.arg(&pdf).arg("--json");
    let output = run(cmd).await;
    output.clone().assert().success();

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["markdown"], TWO_PAGE_MARKDOWN);
    assert_eq!(v["stats"]["page_count"], 2);
    assert_eq!(v["pages"][0]["page_num"], 1);
}

#[test]
fn help_lists_exit_codes() {
    Command::cargo_bin("pdf2md")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn full_stdout_exits_with_output_error() {
    let server = MockServer::start().await;
    mount_ocr(
        &server,
        "https://example.com/doc.pdf",
        ResponseTemplate::new(200).set_body_json(two_page_response()),
        1,
    )
    .await;

    let full = std::fs::OpenOptions::new().write(true).open("/dev/full").unwrap();
    let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("pdf2md"));
    cmd.env("MISTRAL_API_KEY", API_KEY)
        .env("MISTRAL_API_BASE_URL", server.uri())
        .env_remove("MISTRAL_OCR_MODEL")
        .env_remove("PDF2MD_OUTPUT")
        .env_remove("RUST_LOG")
        .arg("https://example.com/doc.pdf")
        .stdout(full);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    output
        .assert()
        .code(5)
        .stderr(predicate::str::contains("<stdout>"));
}
