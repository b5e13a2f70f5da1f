//! Candidate documents folders on the local machine.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const DOCUMENTS: &str = "Documents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Windows,
    MacOs,
    #[default]
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Other => std::env::consts::OS,
        }
    }
}

/// Snapshot of the process environment used to derive candidate folders.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    pub cwd: Option<PathBuf>,
    pub home: Option<PathBuf>,
    /// The platform's standard documents folder.
    pub documents_dir: Option<PathBuf>,
    pub username: Option<String>,
    pub platform: Platform,
}

impl HostEnvironment {
    pub fn current() -> Self {
        let platform = Platform::current();
        let user_var = if platform == Platform::Windows {
            "USERNAME"
        } else {
            "USER"
        };
        Self {
            cwd: std::env::current_dir().ok(),
            home: dirs::home_dir(),
            documents_dir: dirs::document_dir(),
            username: std::env::var(user_var).ok().filter(|u| !u.is_empty()),
            platform,
        }
    }
}

/// A candidate folder together with whether it is currently usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCandidate {
    pub path: PathBuf,
    pub valid: bool,
}

/// Enumerates documents folders in priority order.
///
/// Nothing is cached: the list is rebuilt from the environment on every call.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    override_dir: Option<PathBuf>,
    host: Option<HostEnvironment>,
}

impl DirectoryLocator {
    pub const fn new(override_dir: Option<PathBuf>) -> Self {
        Self {
            override_dir,
            host: None,
        }
    }

    /// Pins the environment instead of reading it from the process.
    #[must_use]
    pub fn with_host(mut self, host: HostEnvironment) -> Self {
        self.host = Some(host);
        self
    }

    pub fn host(&self) -> HostEnvironment {
        self.host.clone().unwrap_or_else(HostEnvironment::current)
    }

    /// Candidate folders, highest priority first, without duplicates.
    pub fn enumerate(&self) -> Vec<PathBuf> {
        let host = self.host();
        let mut candidates = Vec::new();

        if let Some(ref dir) = self.override_dir {
            candidates.push(dir.clone());
        }

        if let Some(ref cwd) = host.cwd {
            candidates.push(cwd.join(DOCUMENTS));
            if let Some(parent) = cwd.parent() {
                candidates.push(parent.join(DOCUMENTS));
            }
        }

        if let Some(ref docs) = host.documents_dir {
            candidates.push(docs.clone());
        }
        if let Some(ref home) = host.home {
            candidates.push(home.join(DOCUMENTS));
        }

        match host.platform {
            Platform::Windows => {
                if let Some(ref home) = host.home {
                    candidates.push(home.join("OneDrive").join(DOCUMENTS));
                }
                if let Some(ref user) = host.username {
                    candidates.push(PathBuf::from(format!("C:/Users/{user}/{DOCUMENTS}")));
                }
            }
            Platform::MacOs => {
                if let Some(ref home) = host.home {
                    candidates.push(
                        home.join("Library/Mobile Documents/com~apple~CloudDocs")
                            .join(DOCUMENTS),
                    );
                }
                if let Some(ref user) = host.username {
                    candidates.push(PathBuf::from(format!("/Users/{user}/{DOCUMENTS}")));
                }
            }
            Platform::Linux => {
                if let Some(ref user) = host.username {
                    candidates.push(PathBuf::from(format!("/home/{user}/{DOCUMENTS}")));
                }
            }
            Platform::Other => {}
        }

        dedup_preserving_order(candidates)
    }

    /// First candidate that exists, is a directory and can be listed.
    pub fn find_first_valid(&self) -> Option<PathBuf> {
        let found = self.enumerate().into_iter().find(|p| is_valid_directory(p));
        match found {
            Some(ref dir) => debug!(dir = %dir.display(), "documents folder selected"),
            None => debug!("no documents folder found"),
        }
        found
    }

    /// Every candidate with its current validity, for diagnostics.
    pub fn inspect(&self) -> Vec<DirectoryCandidate> {
        self.enumerate()
            .into_iter()
            .map(|path| DirectoryCandidate {
                valid: is_valid_directory(&path),
                path,
            })
            .collect()
    }
}

/// Exists, is a directory and is readable.
pub fn is_valid_directory(path: &Path) -> bool {
    path.is_dir() && fs::read_dir(path).is_ok()
}

fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    let mut unique = Vec::new();
    for path in paths {
        let key = normalize_lexically(&path);
        if !seen.contains(&key) {
            seen.push(key);
            unique.push(path);
        }
    }
    unique
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn linux_host(cwd: &Path, home: &Path) -> HostEnvironment {
        HostEnvironment {
            cwd: Some(cwd.to_path_buf()),
            home: Some(home.to_path_buf()),
            documents_dir: Some(home.join("Documents")),
            username: Some("alice".to_string()),
            platform: Platform::Linux,
        }
    }

    #[test]
    fn test_enumerate_priority_order() {
        let locator = DirectoryLocator::new(Some(PathBuf::from("/srv/shared")))
            .with_host(linux_host(Path::new("/work/project"), Path::new("/home/alice")));

        assert_eq!(
            locator.enumerate(),
            vec![
                PathBuf::from("/srv/shared"),
                PathBuf::from("/work/project/Documents"),
                PathBuf::from("/work/Documents"),
                PathBuf::from("/home/alice/Documents"),
            ]
        );
    }

    #[test]
    fn test_enumerate_dedups_normalized_paths() {
        let host = linux_host(Path::new("/home/alice"), Path::new("/home/alice"));
        let locator =
            DirectoryLocator::new(Some(PathBuf::from("/home/alice/./Documents"))).with_host(host);

        let candidates = locator.enumerate();
        assert_eq!(candidates[0], PathBuf::from("/home/alice/./Documents"));
        assert_eq!(candidates[1], PathBuf::from("/home/Documents"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_enumerate_windows_extras() {
        let host = HostEnvironment {
            cwd: None,
            home: Some(PathBuf::from("C:/Users/bob")),
            documents_dir: None,
            username: Some("robert".to_string()),
            platform: Platform::Windows,
        };
        let candidates = DirectoryLocator::new(None).with_host(host).enumerate();
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("C:/Users/bob/Documents"),
                PathBuf::from("C:/Users/bob/OneDrive/Documents"),
                PathBuf::from("C:/Users/robert/Documents"),
            ]
        );
    }

    #[test]
    fn test_enumerate_macos_extras() {
        let host = HostEnvironment {
            home: Some(PathBuf::from("/Users/carol")),
            username: Some("carol".to_string()),
            platform: Platform::MacOs,
            ..HostEnvironment::default()
        };
        let candidates = DirectoryLocator::new(None).with_host(host).enumerate();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[1].ends_with("com~apple~CloudDocs/Documents"));
    }

    #[test]
    fn test_find_first_valid_skips_missing() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().join("project");
        fs::create_dir_all(cwd.join("Documents")).unwrap();

        let locator = DirectoryLocator::new(Some(temp.path().join("missing")))
            .with_host(linux_host(&cwd, &temp.path().join("nohome")));

        assert_eq!(locator.find_first_valid(), Some(cwd.join("Documents")));
    }

    #[test]
    fn test_find_first_valid_rejects_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Documents");
        fs::write(&file, b"not a dir").unwrap();

        let host = HostEnvironment {
            cwd: Some(temp.path().to_path_buf()),
            ..HostEnvironment::default()
        };
        let locator = DirectoryLocator::new(None).with_host(host);
        assert_ne!(locator.find_first_valid(), Some(file));
    }

    #[test]
    fn test_override_wins_when_valid() {
        let temp = TempDir::new().unwrap();
        let override_dir = temp.path().join("custom");
        fs::create_dir_all(&override_dir).unwrap();
        fs::create_dir_all(temp.path().join("Documents")).unwrap();

        let locator = DirectoryLocator::new(Some(override_dir.clone()))
            .with_host(linux_host(temp.path(), temp.path()));

        assert_eq!(locator.find_first_valid(), Some(override_dir));
    }

    #[test]
    fn test_inspect_reports_validity() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Documents")).unwrap();
        let host = HostEnvironment {
            cwd: Some(temp.path().to_path_buf()),
            ..HostEnvironment::default()
        };

        let candidates = DirectoryLocator::new(None).with_host(host).inspect();
        assert_eq!(candidates[0].path, temp.path().join("Documents"));
        assert!(candidates[0].valid);
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("../x")), PathBuf::from("../x"));
    }
}
