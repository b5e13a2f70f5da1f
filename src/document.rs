//! Supported document kinds and resolved source documents.

use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::storage::StorageLocation;

/// File extensions the translation backend accepts, lower-case with leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc"];

/// Content kind of a document, inferred purely from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
}

impl DocumentKind {
    /// Infers the kind from a file or object name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Infers the kind from an extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type sent to backends that require explicit typing.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Doc => "application/msword",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Doc => ".doc",
        }
    }

    /// Human-readable label used in success messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX document",
            Self::Doc => "DOC document",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns `true` if the name ends in one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_name(name: &str) -> bool {
    DocumentKind::from_name(name).is_some()
}

/// Where a resolved source came from.
///
/// Exactly one provenance is recorded per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Local(PathBuf),
    Storage(StorageLocation),
}

/// Readable document bytes plus provenance metadata.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub content: Bytes,
    pub display_name: String,
    pub kind: DocumentKind,
    pub provenance: Provenance,
    /// Local copy materialized for a storage source, if any.
    pub temp_path: Option<PathBuf>,
}

impl ResolvedSource {
    pub const fn is_storage(&self) -> bool {
        matches!(self.provenance, Provenance::Storage(_))
    }

    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}
