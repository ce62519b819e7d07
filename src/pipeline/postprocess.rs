//! Optional tidy pass over the assembled Markdown.
//!
//! OCR output is already Markdown, so by default it is written untouched.
//! With `tidy` enabled these deterministic rules run in order:
//!
//! 1. Normalise line endings (CRLF / CR → LF)
//! 2. Trim trailing whitespace per line
//! 3. Collapse runs of blank lines down to a single blank line
//! 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 5. End the document with exactly one newline
//!
//! Line endings go first so the later rules only ever see `\n`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all tidy rules to `input`.
pub fn tidy(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

static RE_TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

fn trim_trailing_whitespace(input: &str) -> String {
    RE_TRAILING_WS.replace_all(input, "").into_owned()
}

static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n\n").into_owned()
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}'], "")
}

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end_matches('\n');
    format!("{trimmed}\n")
}
