//! Progress-callback trait for conversion stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! which step of the pipeline is running. The CLI uses it to drive a
//! spinner; library callers can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use mistral_pdf2md::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage(&self, stage: Stage) {
//!         eprintln!("now: {stage}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// One step of a conversion, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Checking the local file or URL.
    ResolvingInput,
    /// Uploading a local PDF to the files API.
    Uploading,
    /// Requesting a signed URL for the uploaded file.
    SigningUrl,
    /// Waiting on the OCR endpoint.
    RunningOcr,
    /// Joining page Markdown into one document.
    Assembling,
    /// Writing the output file.
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ResolvingInput => "Resolving input",
            Stage::Uploading => "Uploading PDF",
            Stage::SigningUrl => "Requesting signed URL",
            Stage::RunningOcr => "Running OCR",
            Stage::Assembling => "Assembling Markdown",
            Stage::Writing => "Writing output",
        };
        f.write_str(s)
    }
}

/// Called by the conversion pipeline as it moves between stages.
///
/// All methods default to no-ops so callers only override what they need.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before anything else happens.
    fn on_conversion_start(&self, input: &str) {
        let _ = input;
    }

    /// Called when a new stage begins.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once after the Markdown has been assembled.
    ///
    /// # Arguments
    /// * `page_count` — pages returned by the OCR API
    fn on_conversion_complete(&self, page_count: usize) {
        let _ = page_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<Stage>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage(&self, stage: Stage) {
            self.stages.lock().unwrap().push(stage);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start("doc.pdf");
        cb.on_stage(Stage::RunningOcr);
        cb.on_conversion_complete(3);
    }

    #[test]
    fn recorder_sees_stages_in_order() {
        let rec = Recorder::default();
        rec.on_stage(Stage::ResolvingInput);
        rec.on_stage(Stage::RunningOcr);
        assert_eq!(
            *rec.stages.lock().unwrap(),
            vec![Stage::ResolvingInput, Stage::RunningOcr]
        );
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Uploading.to_string(), "Uploading PDF");
        assert_eq!(Stage::Writing.to_string(), "Writing output");
    }
}
