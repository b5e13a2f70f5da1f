use serde::Serialize;
use std::path::PathBuf;

use crate::document::DocumentKind;
use crate::error::{Error, ErrorKind};
use crate::storage::StorageLocation;
use crate::translation::SourceLanguage;

/// Where a translated document was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Destination {
    Local {
        path: PathBuf,
    },
    Storage {
        location: StorageLocation,
        url: String,
    },
}

impl Destination {
    /// File or object name of the output.
    pub fn file_name(&self) -> String {
        match self {
            Self::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Storage { location, .. } => location.file_name().to_string(),
        }
    }

    /// Folder or container holding the output.
    pub fn location_label(&self) -> String {
        match self {
            Self::Local { path } => path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Self::Storage { location, .. } => format!("container '{}'", location.container),
        }
    }

    /// Full path or URL of the output.
    pub fn identifier(&self) -> String {
        match self {
            Self::Local { path } => path.display().to_string(),
            Self::Storage { url, .. } => url.clone(),
        }
    }

    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// A completed translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    /// The reference as given by the caller.
    pub input: String,
    /// Name of the resolved source file or object.
    pub input_name: String,
    pub kind: DocumentKind,
    pub source_language: SourceLanguage,
    pub target_language: String,
    pub destination: Destination,
    pub byte_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Terminal result of a translation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TranslationOutcome {
    Success(Delivery),
    Failure(Failure),
}

impl TranslationOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }

    /// Process exit code for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => exitcode::OK,
            Self::Failure(failure) => failure.kind.exit_code(),
        }
    }
}

impl From<Result<Delivery, Error>> for TranslationOutcome {
    fn from(result: Result<Delivery, Error>) -> Self {
        match result {
            Ok(delivery) => Self::Success(delivery),
            Err(err) => Self::Failure(err.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn delivery() -> Delivery {
        Delivery {
            input: "report.pdf".to_string(),
            input_name: "Report.PDF".to_string(),
            kind: DocumentKind::Pdf,
            source_language: SourceLanguage::Auto,
            target_language: "es".to_string(),
            destination: Destination::Local {
                path: PathBuf::from("/home/a/Documents/Report_es.PDF"),
            },
            byte_count: 42,
        }
    }

    #[test]
    fn test_destination_labels() {
        let local = Destination::Local {
            path: PathBuf::from("/home/a/Documents/Report_es.pdf"),
        };
        assert_eq!(local.file_name(), "Report_es.pdf");
        assert_eq!(local.location_label(), "/home/a/Documents");

        let storage = Destination::Storage {
            location: StorageLocation::new("docs", "2024/report_es.pdf"),
            url: "https://acct.blob.core.windows.net/docs/2024/report_es.pdf".to_string(),
        };
        assert_eq!(storage.file_name(), "report_es.pdf");
        assert_eq!(storage.location_label(), "container 'docs'");
        assert!(storage.identifier().starts_with("https://"));
    }

    #[test]
    fn test_failure_from_error() {
        let outcome = TranslationOutcome::from(Err::<Delivery, _>(Error::InvalidLanguage {
            input: "klingon".to_string(),
            role: "target",
        }));
        assert_eq!(outcome.failure_kind(), Some(ErrorKind::InvalidLanguage));
        assert_eq!(outcome.exit_code(), exitcode::USAGE);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(TranslationOutcome::Success(delivery())).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["destination"]["type"], "local");
        assert_eq!(json["byte_count"], 42);
        assert_eq!(json["kind"], "pdf");
    }
}
