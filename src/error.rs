//! Failure taxonomy for translation requests.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::SUPPORTED_EXTENSIONS;
use crate::locate::{MAX_LISTED_FILES, Suggestions};
use crate::storage::StorageError;
use crate::translation::TranslatorError;

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    DirectoryNotFound,
    FileNotFound,
    UnsupportedFormat,
    UnreadableFile,
    InvalidLanguage,
    MalformedReference,
    StorageObjectNotFound,
    StorageBackendUnavailable,
    TranslationCredentialsMissing,
    TranslationBackendError,
    UploadFailed,
    UnexpectedError,
}

impl ErrorKind {
    /// Heading used in user-facing failure messages.
    pub const fn title(self) -> &'static str {
        match self {
            Self::DirectoryNotFound => "Cannot Find Documents Folder",
            Self::FileNotFound => "File Not Found",
            Self::UnsupportedFormat => "Unsupported File Type",
            Self::UnreadableFile => "File Not Readable",
            Self::InvalidLanguage => "Invalid Language",
            Self::MalformedReference => "Malformed Reference",
            Self::StorageObjectNotFound => "Storage Object Not Found",
            Self::StorageBackendUnavailable => "Storage Unavailable",
            Self::TranslationCredentialsMissing => "Translation Credentials Missing",
            Self::TranslationBackendError => "Translation Failed",
            Self::UploadFailed => "Saving Output Failed",
            Self::UnexpectedError => "Unexpected Error",
        }
    }

    /// Process exit code for the CLI.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::DirectoryNotFound | Self::FileNotFound | Self::StorageObjectNotFound => {
                exitcode::NOINPUT
            }
            Self::UnsupportedFormat => exitcode::DATAERR,
            Self::UnreadableFile => exitcode::NOPERM,
            Self::InvalidLanguage | Self::MalformedReference => exitcode::USAGE,
            Self::StorageBackendUnavailable | Self::TranslationBackendError => {
                exitcode::UNAVAILABLE
            }
            Self::TranslationCredentialsMissing => exitcode::CONFIG,
            Self::UploadFailed => exitcode::CANTCREAT,
            Self::UnexpectedError => exitcode::SOFTWARE,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", render_directory_not_found(searched, platform, home.as_ref()))]
    DirectoryNotFound {
        searched: Vec<PathBuf>,
        platform: String,
        home: Option<PathBuf>,
    },

    /// `suggestions` is present when a folder was searched by filename.
    #[error("{}", render_file_not_found(reference, location, suggestions.as_ref()))]
    FileNotFound {
        reference: String,
        location: String,
        suggestions: Option<Suggestions>,
    },

    #[error(
        "Unsupported file type: {}. Supported: {}",
        if extension.is_empty() { "(none)" } else { extension.as_str() },
        SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedFormat { reference: String, extension: String },

    #[error("{reason}: {}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error(
        "Unsupported {role} language: '{input}'. Use a language name (e.g. spanish) or a 2-3 letter code (e.g. es). Run `dtl languages` for the full list."
    )]
    InvalidLanguage { input: String, role: &'static str },

    #[error("{0}")]
    MalformedReference(String),

    #[error("Object not found: {0}")]
    StorageObjectNotFound(String),

    #[error("{0}")]
    StorageBackendUnavailable(String),

    #[error(
        "Document translation is not configured. Set {}.",
        missing.join(" and ")
    )]
    TranslationCredentialsMissing { missing: Vec<&'static str> },

    #[error("{0}")]
    TranslationBackend(String),

    #[error("Could not save translated document to {destination}: {reason}")]
    UploadFailed { destination: String, reason: String },

    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::UnreadableFile { .. } => ErrorKind::UnreadableFile,
            Self::InvalidLanguage { .. } => ErrorKind::InvalidLanguage,
            Self::MalformedReference(_) => ErrorKind::MalformedReference,
            Self::StorageObjectNotFound(_) => ErrorKind::StorageObjectNotFound,
            Self::StorageBackendUnavailable(_) => ErrorKind::StorageBackendUnavailable,
            Self::TranslationCredentialsMissing { .. } => ErrorKind::TranslationCredentialsMissing,
            Self::TranslationBackend(_) => ErrorKind::TranslationBackendError,
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::Unexpected(_) => ErrorKind::UnexpectedError,
        }
    }

    /// Storage failure while writing output.
    pub fn upload(destination: impl Into<String>, err: &StorageError) -> Self {
        Self::UploadFailed {
            destination: destination.into(),
            reason: err.to_string(),
        }
    }
}

/// Storage failures while resolving a source.
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MalformedReference(msg) => Self::MalformedReference(msg),
            StorageError::NotFound(target) => Self::StorageObjectNotFound(target),
            StorageError::Unavailable(msg) => Self::StorageBackendUnavailable(msg),
            StorageError::LocalFileMissing(path) => Self::FileNotFound {
                reference: path.display().to_string(),
                location: "local filesystem".to_string(),
                suggestions: None,
            },
            StorageError::AlreadyExists(target) => Self::UploadFailed {
                destination: target,
                reason: "object already exists".to_string(),
            },
        }
    }
}

impl From<TranslatorError> for Error {
    fn from(err: TranslatorError) -> Self {
        Self::TranslationBackend(err.to_string())
    }
}

fn render_directory_not_found(
    searched: &[PathBuf],
    platform: &str,
    home: Option<&PathBuf>,
) -> String {
    let mut out = String::from("No accessible Documents folder was found.\n\nSearched paths:");
    for path in searched {
        let _ = write!(out, "\n  • {}", path.display());
    }
    let _ = write!(out, "\n\nSystem: {platform}");
    if let Some(home) = home {
        let _ = write!(out, "\nUser home: {}", home.display());
    }
    out.push_str("\n\nSet DOCUMENTS_FOLDER_PATH to point at your documents.");
    out
}

fn render_file_not_found(
    reference: &str,
    location: &str,
    suggestions: Option<&Suggestions>,
) -> String {
    let Some(suggestions) = suggestions else {
        return format!("File not found: {reference}");
    };

    let mut out = format!("File '{reference}' not found in {location}");

    if suggestions.total_available == 0 {
        out.push_str("\n\nNo translatable files found in Documents folder.");
    } else if !suggestions.similar.is_empty() {
        out.push_str("\n\n**Did you mean:**");
        for name in &suggestions.similar {
            let _ = write!(out, "\n  • {name}");
        }
    } else {
        out.push_str("\n\n**Available files:**");
        for name in &suggestions.available {
            let _ = write!(out, "\n  • {name}");
        }
        if suggestions.total_available > MAX_LISTED_FILES {
            let _ = write!(
                out,
                "\n  ... and {} more",
                suggestions.total_available - MAX_LISTED_FILES
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(suggestions: Suggestions) -> Error {
        Error::FileNotFound {
            reference: "contract.pdf".to_string(),
            location: "Documents folder: /home/a/Documents".to_string(),
            suggestions: Some(suggestions),
        }
    }

    #[test]
    fn test_file_not_found_empty_folder() {
        let message = not_found(Suggestions::default()).to_string();
        assert!(message.starts_with("File 'contract.pdf' not found in Documents folder"));
        assert!(message.contains("No translatable files found"));
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_file_not_found_with_similar() {
        let message = not_found(Suggestions {
            similar: vec!["contract_v2.pdf".to_string()],
            available: vec!["a.pdf".to_string(), "contract_v2.pdf".to_string()],
            total_available: 2,
        })
        .to_string();
        assert!(message.contains("**Did you mean:**\n  • contract_v2.pdf"));
        assert!(!message.contains("Available files"));
    }

    #[test]
    fn test_file_not_found_lists_available_with_overflow() {
        let available: Vec<String> = (1..=5).map(|i| format!("doc{i}.pdf")).collect();
        let message = not_found(Suggestions {
            similar: vec![],
            available,
            total_available: 8,
        })
        .to_string();
        assert!(message.contains("**Available files:**"));
        assert!(message.contains("  • doc5.pdf"));
        assert!(message.ends_with("... and 3 more"));
    }

    #[test]
    fn test_directory_not_found_lists_paths() {
        let err = Error::DirectoryNotFound {
            searched: vec![PathBuf::from("/a/Documents"), PathBuf::from("/b/Documents")],
            platform: "Linux".to_string(),
            home: Some(PathBuf::from("/home/a")),
        };
        let message = err.to_string();
        assert!(message.contains("  • /a/Documents\n  • /b/Documents"));
        assert!(message.contains("System: Linux"));
        assert!(message.contains("User home: /home/a"));
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }

    #[test]
    fn test_credentials_missing_names_variables() {
        let err = Error::TranslationCredentialsMissing {
            missing: vec!["AZURE_DOCUMENT_TRANSLATION_ENDPOINT", "AZURE_DOCUMENT_TRANSLATION_KEY"],
        };
        assert!(err.to_string().contains(
            "AZURE_DOCUMENT_TRANSLATION_ENDPOINT and AZURE_DOCUMENT_TRANSLATION_KEY"
        ));
        assert_eq!(err.kind().exit_code(), exitcode::CONFIG);
    }

    #[test]
    fn test_unsupported_format_lists_extensions() {
        let err = Error::UnsupportedFormat {
            reference: "notes.txt".to_string(),
            extension: ".txt".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file type: .txt. Supported: .pdf, .docx, .doc"
        );
    }

    #[test]
    fn test_storage_error_mapping() {
        assert_eq!(
            Error::from(StorageError::NotFound("c/k".to_string())).kind(),
            ErrorKind::StorageObjectNotFound
        );
        assert_eq!(
            Error::from(StorageError::Unavailable("down".to_string())).kind(),
            ErrorKind::StorageBackendUnavailable
        );
        assert_eq!(
            Error::from(StorageError::MalformedReference("bad".to_string())).kind(),
            ErrorKind::MalformedReference
        );
        assert_eq!(
            Error::upload("c/k", &StorageError::Unavailable("503".to_string())).kind(),
            ErrorKind::UploadFailed
        );
    }

    #[test]
    fn test_exit_codes_are_distinct_from_success() {
        let kinds = [
            ErrorKind::DirectoryNotFound,
            ErrorKind::FileNotFound,
            ErrorKind::UnsupportedFormat,
            ErrorKind::UnreadableFile,
            ErrorKind::InvalidLanguage,
            ErrorKind::MalformedReference,
            ErrorKind::StorageObjectNotFound,
            ErrorKind::StorageBackendUnavailable,
            ErrorKind::TranslationCredentialsMissing,
            ErrorKind::TranslationBackendError,
            ErrorKind::UploadFailed,
            ErrorKind::UnexpectedError,
        ];
        for kind in kinds {
            assert_ne!(kind.exit_code(), exitcode::OK);
            assert!(!kind.title().is_empty());
        }
    }
}
