//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements one step; [`crate::convert`] runs them in order.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ ocr ──▶ render ──▶ postprocess
//! (path/URL) (Mistral API) (pages → Markdown) (optional tidy)
//! ```
//!
//! 1. [`input`]  — classify the reference; read and sanity-check local PDFs
//! 2. [`ocr`]    — upload / sign / OCR calls against the Mistral API; the
//!    only stage with network I/O
//! 3. [`render`] — inline images and join pages with the separator
//! 4. [`postprocess`] — deterministic whitespace cleanup, opt-in

pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
