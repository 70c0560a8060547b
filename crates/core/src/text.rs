//! Loose text normalization and keyword extraction.
//!
//! Two canonical forms are used across the pipeline:
//! - [`normalize`] produces the aggressive form used wherever two free-text
//!   strings are compared loosely (canned-response lookup, intent keyword
//!   matching, evidence deduplication).
//! - [`clean`] produces the mild form used for embedding inputs and as the
//!   embedding cache key (whitespace and control characters only).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Interrogative stop-words excluded from keyword extraction.
///
/// Spanish forms are listed without diacritics because tokens are lowercased
/// ASCII runs by the time they are compared.
const QUESTION_WORDS: &[&str] = &[
    "quien", "quienes", "que", "como", "cuando", "donde", "por", "para", "cual", "cuales",
    "cuanto", "cuantos", "cuanta", "cuantas", "porque",
];

/// Canonicalize text for loose comparison.
///
/// Decomposes to NFD and drops combining marks (so "cómo" and "como" compare
/// equal), lowercases, replaces every non-word character with a space,
/// collapses any run of 2+ identical characters to a single one (so elongated
/// greetings like "Holaaaa!!" reduce to "hola"), and collapses whitespace.
///
/// Total function: never fails, empty input yields empty output.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.nfd().filter(|c| !is_combining_mark(*c)) {
        for low in ch.to_lowercase() {
            if low.is_alphanumeric() || low == '_' {
                cleaned.push(low);
            } else {
                cleaned.push(' ');
            }
        }
    }

    // Collapse runs of identical characters before whitespace folding,
    // matching the comparison form used for duplicate detection.
    let mut collapsed = String::with_capacity(cleaned.len());
    let mut prev: Option<char> = None;
    for ch in cleaned.chars() {
        if prev != Some(ch) {
            collapsed.push(ch);
        }
        prev = Some(ch);
    }

    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize whitespace, strip control characters, and unify Unicode (NFC).
///
/// Unlike [`normalize`], this keeps case, punctuation, and repeated letters;
/// it only makes the text safe and stable for embedding requests.
pub fn clean(text: &str) -> String {
    let composed: String = text
        .nfc()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract content keywords from a message.
///
/// Tokenizes on ASCII alphanumeric runs, lowercases each token, drops
/// interrogative stop-words, and keeps a token when it is at least 5
/// characters long or the original token was fully upper-case and at least
/// 3 characters (so product acronyms like "CYPE" or "SAP2000" survive).
/// First-occurrence order is preserved; later duplicates are dropped.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    for token in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token.is_empty() {
            continue;
        }
        let lowered = token.to_ascii_lowercase();
        if QUESTION_WORDS.contains(&lowered.as_str()) {
            continue;
        }
        if lowered.len() >= 5 || (is_upper_token(token) && lowered.len() >= 3) {
            if !keywords.contains(&lowered) {
                keywords.push(lowered);
            }
        }
    }
    keywords
}

/// A token counts as upper-case when it has at least one cased character and
/// no lower-case ones (digits are uncased, so "SAP2000" qualifies).
fn is_upper_token(token: &str) -> bool {
    token.chars().any(|c| c.is_uppercase()) && !token.chars().any(|c| c.is_lowercase())
}
