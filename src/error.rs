//! Error types for the mistral-pdf2md library.
//!
//! Every failure is fatal to the single conversion: nothing is retried and
//! nothing is partially written. [`Pdf2MdError`] carries enough context to
//! tell the user which stage failed, and [`Pdf2MdError::kind`] groups the
//! variants into the four categories the CLI maps onto exit codes.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure category of a [`Pdf2MdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid credential / settings.
    Configuration,
    /// Unreadable or invalid input reference.
    Input,
    /// Non-success response or malformed payload from the OCR API.
    RemoteService,
    /// Output target could not be created or written.
    Output,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this category.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Input => 3,
            ErrorKind::RemoteService => 4,
            ErrorKind::Output => 5,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Input => "input",
            ErrorKind::RemoteService => "remote service",
            ErrorKind::Output => "output",
        };
        f.write_str(s)
    }
}

/// Which Mistral API call a remote error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStage {
    /// `POST /v1/files`
    Upload,
    /// `GET /v1/files/{id}/url`
    SignedUrl,
    /// `POST /v1/ocr`
    Ocr,
}

impl fmt::Display for ApiStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiStage::Upload => "upload",
            ApiStage::SignedUrl => "signed-url",
            ApiStage::Ocr => "ocr",
        };
        f.write_str(s)
    }
}

/// All fatal errors returned by the mistral-pdf2md library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No API key in the config and none in the environment.
    #[error("Mistral API key is missing.\nPass --api-key or set {var}.")]
    MissingApiKey { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a file path or a usable URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// Reading the local file failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Remote service errors ─────────────────────────────────────────────
    /// The request never got a response (DNS, TLS, connection, timeout).
    #[error("Mistral API {stage} request failed: {reason}")]
    RequestFailed { stage: ApiStage, reason: String },

    /// The API answered with a non-success HTTP status.
    #[error("Mistral API {stage} request returned HTTP {status}: {body}")]
    ApiStatus {
        stage: ApiStage,
        status: u16,
        body: String,
    },

    /// The API answered 2xx but the body could not be decoded.
    #[error("Malformed Mistral API {stage} response: {detail}")]
    MalformedResponse { stage: ApiStage, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Pdf2MdError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2MdError::MissingApiKey { .. } | Pdf2MdError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            Pdf2MdError::FileNotFound { .. }
            | Pdf2MdError::PermissionDenied { .. }
            | Pdf2MdError::InvalidInput { .. }
            | Pdf2MdError::NotAPdf { .. }
            | Pdf2MdError::ReadFailed { .. } => ErrorKind::Input,
            Pdf2MdError::RequestFailed { .. }
            | Pdf2MdError::ApiStatus { .. }
            | Pdf2MdError::MalformedResponse { .. } => ErrorKind::RemoteService,
            Pdf2MdError::OutputWriteFailed { .. } => ErrorKind::Output,
        }
    }
}
