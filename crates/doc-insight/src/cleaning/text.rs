//! Text normalization

use once_cell::sync::Lazy;
use regex::Regex;

// Anything but letters, combining marks, digits and whitespace; `_` included
static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}\s]").expect("valid punctuation pattern"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip punctuation and symbols, collapse whitespace runs to one space, trim
pub fn clean_text(text: &str) -> String {
    let stripped = PUNCTUATION_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}
