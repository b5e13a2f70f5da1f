//! Object storage addressing: URLs and `container/key` paths.

use serde::Serialize;
use std::fmt;
use url::Url;

use super::StorageError;
use crate::fs::sibling_name;

/// Host fragments that identify an object-storage URL.
pub const STORAGE_DOMAIN_MARKERS: &[&str] = &["blob.core.windows.net"];

/// A container plus object key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StorageLocation {
    pub container: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// The last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// The key's extension including the dot, or an empty string.
    pub fn extension(&self) -> String {
        self.file_name()
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default()
    }

    /// Sibling key in the same container and prefix with `_<language>` inserted
    /// before the extension.
    pub fn sibling(&self, language: &str) -> Self {
        let renamed = sibling_name(self.file_name(), language);
        let key = match self.key.rsplit_once('/') {
            Some((prefix, _)) => format!("{prefix}/{renamed}"),
            None => renamed,
        };
        Self::new(self.container.clone(), key)
    }

    /// Replaces the file name while keeping the key prefix.
    pub fn with_file_name(&self, name: &str) -> Self {
        let key = match self.key.rsplit_once('/') {
            Some((prefix, _)) => format!("{prefix}/{name}"),
            None => name.to_string(),
        };
        Self::new(self.container.clone(), key)
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Components of a storage URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrl {
    pub account: String,
    pub location: StorageLocation,
}

/// Returns `true` if `text` is an `https` URL whose host carries a storage marker.
pub fn is_storage_url(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.starts_with("https://") {
        return false;
    }
    Url::parse(trimmed).is_ok_and(|url| {
        url.host_str()
            .is_some_and(|host| STORAGE_DOMAIN_MARKERS.iter().any(|m| host.contains(m)))
    })
}

/// Heuristic check for a `container/key` string.
///
/// Not absolute, not starting with `./`, `../` or `~`, no backslashes, drive
/// letter or URL scheme, and containing a `/` with non-empty text on both
/// sides.
pub fn looks_like_storage_path(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.starts_with('/')
        || trimmed.starts_with("./")
        || trimmed.starts_with("../")
        || trimmed.starts_with('~')
        || trimmed.contains('\\')
        || trimmed.contains("://")
        || has_drive_prefix(trimmed)
    {
        return false;
    }
    trimmed
        .split_once('/')
        .is_some_and(|(container, key)| !container.is_empty() && !key.is_empty())
}

/// Recognizes storage URLs and, heuristically, `container/key` paths.
pub fn is_storage_reference(text: &str) -> bool {
    is_storage_url(text) || looks_like_storage_path(text)
}

/// Splits a storage URL into account, container and key.
pub fn parse_url(text: &str) -> Result<StorageUrl, StorageError> {
    let url = Url::parse(text.trim())
        .map_err(|e| StorageError::MalformedReference(format!("'{text}' is not a URL: {e}")))?;

    let account = url
        .host_str()
        .and_then(|host| host.split('.').next())
        .filter(|account| !account.is_empty())
        .ok_or_else(|| {
            StorageError::MalformedReference(format!("'{text}' has no storage account host"))
        })?
        .to_string();

    let path = url.path().trim_start_matches('/');
    let location = split_container_key(path).ok_or_else(|| {
        StorageError::MalformedReference(format!(
            "'{text}' must name a container and an object: https://<account>.blob.core.windows.net/<container>/<name>"
        ))
    })?;

    Ok(StorageUrl {
        account,
        location: StorageLocation::new(
            decode(&location.container),
            location
                .key
                .split('/')
                .map(decode)
                .collect::<Vec<_>>()
                .join("/"),
        ),
    })
}

/// Splits `container/key` into its parts.
pub fn parse_path(text: &str) -> Result<StorageLocation, StorageError> {
    let trimmed = text.trim().trim_start_matches("./").trim_start_matches('/');
    split_container_key(trimmed).ok_or_else(|| {
        StorageError::MalformedReference(format!(
            "'{text}' must be in the form <container>/<name>"
        ))
    })
}

fn split_container_key(path: &str) -> Option<StorageLocation> {
    let (container, key) = path.split_once('/')?;
    let key = key.trim_matches('/');
    if container.is_empty() || key.is_empty() {
        return None;
    }
    Some(StorageLocation::new(container, key))
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
}

fn has_drive_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_storage_url() {
        assert!(is_storage_url(
            "https://acct.blob.core.windows.net/docs/report.pdf"
        ));
        assert!(!is_storage_url("http://acct.blob.core.windows.net/docs/a.pdf"));
        assert!(!is_storage_url("https://example.com/docs/report.pdf"));
        assert!(!is_storage_url("docs/report.pdf"));
    }

    #[test]
    fn test_looks_like_storage_path() {
        assert!(looks_like_storage_path("mycontainer/report.pdf"));
        assert!(looks_like_storage_path("docs/2024/q1/report.pdf"));
        assert!(!looks_like_storage_path("/abs/report.pdf"));
        assert!(!looks_like_storage_path("./local/report.pdf"));
        assert!(!looks_like_storage_path("../up/report.pdf"));
        assert!(!looks_like_storage_path("C:/Users/me/report.pdf"));
        assert!(!looks_like_storage_path("~/Documents/report.pdf"));
        assert!(!looks_like_storage_path("inbox\\q1/report.pdf"));
        assert!(!looks_like_storage_path("report.pdf"));
        assert!(!looks_like_storage_path("container/"));
        assert!(!looks_like_storage_path("https://example.com/a.pdf"));
    }

    #[test]
    fn test_parse_url() {
        let parsed =
            parse_url("https://acct.blob.core.windows.net/docs/2024/My%20Report.pdf").unwrap();
        assert_eq!(parsed.account, "acct");
        assert_eq!(parsed.location.container, "docs");
        assert_eq!(parsed.location.key, "2024/My Report.pdf");
    }

    #[test]
    fn test_parse_url_requires_key() {
        let err = parse_url("https://acct.blob.core.windows.net/docs").unwrap_err();
        assert!(matches!(err, StorageError::MalformedReference(_)));
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_parse_path() {
        let location = parse_path("mycontainer/folder/report.pdf").unwrap();
        assert_eq!(location, StorageLocation::new("mycontainer", "folder/report.pdf"));

        let location = parse_path("/mycontainer/report.pdf").unwrap();
        assert_eq!(location.container, "mycontainer");
    }

    #[test]
    fn test_parse_path_without_separator_is_malformed() {
        let err = parse_path("report.pdf").unwrap_err();
        assert!(err.to_string().contains("<container>/<name>"));
        assert!(parse_path("container/").is_err());
    }

    #[test]
    fn test_sibling_preserves_prefix() {
        let location = StorageLocation::new("docs", "2024/q1/report.pdf");
        assert_eq!(
            location.sibling("es"),
            StorageLocation::new("docs", "2024/q1/report_es.pdf")
        );
        assert_eq!(
            StorageLocation::new("mycontainer", "report.pdf").sibling("es"),
            StorageLocation::new("mycontainer", "report_es.pdf")
        );
    }

    #[test]
    fn test_file_name_and_extension() {
        let location = StorageLocation::new("docs", "a/b/Invoice.DOCX");
        assert_eq!(location.file_name(), "Invoice.DOCX");
        assert_eq!(location.extension(), ".DOCX");
        assert_eq!(StorageLocation::new("docs", "README").extension(), "");
    }
}
