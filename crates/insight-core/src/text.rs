//! Free-text normalization helpers

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Flatten user-supplied text into a single trimmed line
///
/// Carriage returns and newlines become spaces, runs of whitespace collapse
/// to a single space, and surrounding whitespace is trimmed.
pub fn clean_text(text: &str) -> String {
    let flattened = text.replace(['\r', '\n'], " ");
    WHITESPACE_RUN.replace_all(&flattened, " ").trim().to_string()
}
