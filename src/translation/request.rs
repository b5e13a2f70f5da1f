//! Parsing of free-form requests such as "translate report.pdf to spanish".

use regex::Regex;
use std::sync::LazyLock;

use super::language::AUTO_DETECT;

// unwrap is safe: the patterns below are compile-time constants
#[allow(clippy::unwrap_used)]
static WITH_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btranslate\s+(\S+)\s+from\s+([\p{L}-]+)\s+(?:to|into)\s+([\p{L}-]+)")
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static TRANSLATE_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btranslate\s+(\S+)\s+(?:to|into)\s+([\p{L}-]+)").unwrap()
});

#[allow(clippy::unwrap_used)]
static BARE_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\S+)\s+(?:to|into)\s+([\p{L}-]+)").unwrap());

/// Reference and languages extracted from a request sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub reference: String,
    pub target_language: String,
    pub source_language: String,
}

/// Recognises, case-insensitively:
/// `translate X from A to B`, `translate X to B` and `X to B`.
///
/// The reference keeps its original casing; languages are returned as typed
/// and still need normalizing.
pub fn parse_request(text: &str) -> Option<ParsedRequest> {
    let text = text.trim();

    if let Some(caps) = WITH_SOURCE.captures(text) {
        return Some(ParsedRequest {
            reference: clean_reference(&caps[1]),
            target_language: caps[3].to_string(),
            source_language: caps[2].to_string(),
        });
    }

    let caps = TRANSLATE_TO
        .captures(text)
        .or_else(|| BARE_TO.captures(text))?;
    Some(ParsedRequest {
        reference: clean_reference(&caps[1]),
        target_language: caps[2].to_string(),
        source_language: AUTO_DETECT.to_string(),
    })
}

fn clean_reference(raw: &str) -> String {
    raw.trim_matches(|c| matches!(c, '"' | '\'' | '`')).to_string()
}
