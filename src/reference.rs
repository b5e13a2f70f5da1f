//! Classification of raw document references into addressing schemes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::storage::{
    StorageError, StorageLocation, is_storage_url, looks_like_storage_path, parse_path,
};

/// A document reference, classified once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentReference {
    /// A name with no path separators, searched for in documents folders.
    BareFilename(String),
    LocalPath(PathBuf),
    /// A full object-storage URL, parsed when resolved.
    StorageUrl(String),
    StoragePath(StorageLocation),
}

impl DocumentReference {
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUrl(_) | Self::StoragePath(_))
    }

    /// Reinterprets the reference for forced storage resolution.
    ///
    /// Bare filenames and URLs are kept; a local path is re-read as
    /// `container/key` after stripping a leading `./` or `/`.
    pub fn into_storage(self) -> Result<Self, StorageError> {
        match self {
            Self::LocalPath(path) => parse_path(&path.to_string_lossy()).map(Self::StoragePath),
            other => Ok(other),
        }
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BareFilename(name) => f.write_str(name),
            Self::LocalPath(path) => write!(f, "{}", path.display()),
            Self::StorageUrl(url) => f.write_str(url),
            Self::StoragePath(location) => write!(f, "{location}"),
        }
    }
}

/// How to read an ambiguous `a/b` reference that is neither absolute nor `./`-prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPreference {
    #[default]
    Storage,
    Local,
}

#[derive(Debug, Error)]
#[error("expected 'storage' or 'local', got '{0}'")]
pub struct ParsePathPreferenceError(String);

impl FromStr for PathPreference {
    type Err = ParsePathPreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "storage" => Ok(Self::Storage),
            "local" => Ok(Self::Local),
            _ => Err(ParsePathPreferenceError(s.to_string())),
        }
    }
}

impl fmt::Display for PathPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Storage => "storage",
            Self::Local => "local",
        })
    }
}

/// Which backend a request resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Follow the classifier.
    #[default]
    Auto,
    /// Resolve everything through object storage.
    Storage,
    /// Resolve everything except storage URLs on the local filesystem.
    Local,
}

impl ResolutionMode {
    pub const fn from_flags(storage: bool, local: bool) -> Self {
        match (storage, local) {
            (true, _) => Self::Storage,
            (false, true) => Self::Local,
            (false, false) => Self::Auto,
        }
    }
}

/// Maps raw strings to [`DocumentReference`] variants without any I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceClassifier {
    ambiguous_paths: PathPreference,
}

impl ReferenceClassifier {
    pub const fn new(ambiguous_paths: PathPreference) -> Self {
        Self { ambiguous_paths }
    }

    pub const fn ambiguous_paths(&self) -> PathPreference {
        self.ambiguous_paths
    }

    /// Classifies `raw`.
    ///
    /// Rules, first hit wins: storage URL; `container/key` when ambiguous
    /// paths prefer storage; anything absolute or containing a separator is
    /// a local path; everything else is a bare filename.
    pub fn classify(&self, raw: &str) -> DocumentReference {
        let text = raw.trim();

        if is_storage_url(text) {
            return DocumentReference::StorageUrl(text.to_string());
        }

        if self.ambiguous_paths == PathPreference::Storage
            && looks_like_storage_path(text)
            && let Ok(location) = parse_path(text)
        {
            return DocumentReference::StoragePath(location);
        }

        if Path::new(text).is_absolute() || text.contains('/') || text.contains('\\') {
            return DocumentReference::LocalPath(PathBuf::from(text));
        }

        DocumentReference::BareFilename(text.to_string())
    }
}
