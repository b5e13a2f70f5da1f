//! Language name and code normalization.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::ui::Style;

/// Recognised language names and their ISO 639-1 codes.
pub const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("arabic", "ar"),
    ("bulgarian", "bg"),
    ("chinese", "zh"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dutch", "nl"),
    ("english", "en"),
    ("estonian", "et"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("german", "de"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("hindi", "hi"),
    ("hungarian", "hu"),
    ("indonesian", "id"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("latvian", "lv"),
    ("lithuanian", "lt"),
    ("malay", "ms"),
    ("norwegian", "no"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("serbian", "sr"),
    ("slovak", "sk"),
    ("slovenian", "sl"),
    ("spanish", "es"),
    ("swedish", "sv"),
    ("tagalog", "tl"),
    ("thai", "th"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
    ("vietnamese", "vi"),
];

/// Sentinel accepted as a source language to request automatic detection.
pub const AUTO_DETECT: &str = "auto";

/// Normalizes a free-form language name or code to a canonical code.
///
/// Any 2-3 letter alphabetic input is accepted verbatim (lower-cased), even
/// if it is not in [`LANGUAGE_NAMES`]. Otherwise the case-folded input is
/// looked up by name. Unknown names return `None`.
pub fn normalize_language(text: &str) -> Option<String> {
    let folded = text.trim().to_lowercase();

    let len = folded.chars().count();
    if (2..=3).contains(&len) && folded.chars().all(char::is_alphabetic) {
        return Some(folded);
    }

    LANGUAGE_NAMES
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, code)| (*code).to_string())
}

/// Source language of a request: either detected by the backend or explicit.
///
/// Serializes as the code, or `"auto"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLanguage {
    Auto,
    Code(String),
}

impl SourceLanguage {
    /// Parses the source argument; `"auto"` (any case) or empty means detection.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTO_DETECT) {
            return Some(Self::Auto);
        }
        normalize_language(trimmed).map(Self::Code)
    }

    /// The code to send to the backend; `None` when detection is requested.
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Code(code) => Some(code),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str(AUTO_DETECT),
            Self::Code(code) => f.write_str(code),
        }
    }
}

impl Serialize for SourceLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Prints recognised language names and codes to stdout.
pub fn print_languages() {
    println!(
        "{}",
        Style::header("Supported languages (use the name or the code)")
    );
    for (name, code) in LANGUAGE_NAMES {
        println!("  {:5} {}", Style::code(code), Style::secondary(name));
    }
    println!();
    println!(
        "{}",
        Style::hint("Any other 2-3 letter code is passed to the backend as-is.")
    );
}
