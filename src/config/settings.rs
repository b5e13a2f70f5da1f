use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::manager::DtlConfig;
use crate::reference::PathPreference;
use crate::storage::{
    ACCOUNT_KEY_VAR, ACCOUNT_NAME_VAR, CONNECTION_STRING_VAR, DEFAULT_CONTAINER_SCAN_LIMIT,
    DEFAULT_PREFERRED_CONTAINERS,
};
use crate::translation::{ENDPOINT_VAR, KEY_VAR};

pub const DOCUMENTS_FOLDER_VAR: &str = "DOCUMENTS_FOLDER_PATH";
pub const PREFERRED_CONTAINERS_VAR: &str = "DTL_PREFERRED_CONTAINERS";
pub const CONTAINER_SCAN_LIMIT_VAR: &str = "DTL_CONTAINER_SCAN_LIMIT";
pub const PARTIAL_MATCHING_VAR: &str = "DTL_PARTIAL_MATCHING";
pub const AMBIGUOUS_PATHS_VAR: &str = "DTL_AMBIGUOUS_PATHS";
pub const SCRATCH_DIR_VAR: &str = "DTL_SCRATCH_DIR";
pub const TIMEOUT_VAR: &str = "DTL_TIMEOUT_SECS";

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub documents_folder: Option<PathBuf>,
    pub translation_endpoint: Option<String>,
    pub translation_key: Option<String>,
    pub storage_connection_string: Option<String>,
    pub storage_account_name: Option<String>,
    pub storage_account_key: Option<String>,
    pub preferred_containers: Vec<String>,
    pub container_scan_limit: usize,
    pub partial_matching: bool,
    pub ambiguous_paths: PathPreference,
    pub scratch_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            documents_folder: None,
            translation_endpoint: None,
            translation_key: None,
            storage_connection_string: None,
            storage_account_name: None,
            storage_account_key: None,
            preferred_containers: DEFAULT_PREFERRED_CONTAINERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            container_scan_limit: DEFAULT_CONTAINER_SCAN_LIMIT,
            partial_matching: true,
            ambiguous_paths: PathPreference::Storage,
            scratch_dir: None,
            timeout: None,
        }
    }
}

/// Values given on the command line; they beat every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub documents_folder: Option<PathBuf>,
    pub partial_matching: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Resolves settings from the process environment and `file`.
    pub fn from_env(file: &DtlConfig) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }

    /// Resolves settings with environment values supplied by `lookup`.
    ///
    /// Environment values win over `file`, which wins over defaults. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F, file: &DtlConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let preferred_containers = match env(PREFERRED_CONTAINERS_VAR) {
            Some(list) => split_list(&list),
            None => file
                .preferred_containers
                .clone()
                .unwrap_or(defaults.preferred_containers),
        };

        let container_scan_limit = match env(CONTAINER_SCAN_LIMIT_VAR) {
            Some(raw) => parse_var(CONTAINER_SCAN_LIMIT_VAR, &raw)?,
            None => file
                .container_scan_limit
                .unwrap_or(defaults.container_scan_limit),
        };

        let partial_matching = match env(PARTIAL_MATCHING_VAR) {
            Some(raw) => parse_bool(PARTIAL_MATCHING_VAR, &raw)?,
            None => file.partial_matching.unwrap_or(defaults.partial_matching),
        };

        let ambiguous_paths = match env(AMBIGUOUS_PATHS_VAR) {
            Some(raw) => parse_var(AMBIGUOUS_PATHS_VAR, &raw)?,
            None => file.ambiguous_paths.unwrap_or(defaults.ambiguous_paths),
        };

        let timeout_secs = match env(TIMEOUT_VAR) {
            Some(raw) => Some(parse_var::<u64>(TIMEOUT_VAR, &raw)?),
            None => file.timeout_secs,
        };

        Ok(Self {
            documents_folder: env(DOCUMENTS_FOLDER_VAR)
                .map(PathBuf::from)
                .or_else(|| file.documents_folder_path.clone()),
            translation_endpoint: env(ENDPOINT_VAR).or_else(|| file.translation_endpoint.clone()),
            translation_key: env(KEY_VAR).or_else(|| file.translation_key.clone()),
            storage_connection_string: env(CONNECTION_STRING_VAR)
                .or_else(|| file.storage_connection_string.clone()),
            storage_account_name: env(ACCOUNT_NAME_VAR)
                .or_else(|| file.storage_account_name.clone()),
            storage_account_key: env(ACCOUNT_KEY_VAR).or_else(|| file.storage_account_key.clone()),
            preferred_containers,
            container_scan_limit,
            partial_matching,
            ambiguous_paths,
            scratch_dir: env(SCRATCH_DIR_VAR)
                .map(PathBuf::from)
                .or_else(|| file.scratch_dir.clone()),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        })
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(ref dir) = overrides.documents_folder {
            self.documents_folder = Some(dir.clone());
        }
        if let Some(partial) = overrides.partial_matching {
            self.partial_matching = partial;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        self
    }

    /// Translation variables that are not set.
    pub fn missing_translation_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.translation_endpoint.is_none() {
            missing.push(ENDPOINT_VAR);
        }
        if self.translation_key.is_none() {
            missing.push(KEY_VAR);
        }
        missing
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("Invalid value for {key}: '{raw}'"))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid value for {key}: '{raw}' (expected true or false)"),
    }
}

/// Masks a secret for display, keeping a short prefix.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]), &DtlConfig::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.preferred_containers,
            vec!["documents", "files", "source", "input", "uploads"]
        );
        assert_eq!(settings.container_scan_limit, 10);
        assert!(settings.partial_matching);
        assert_eq!(settings.ambiguous_paths, PathPreference::Storage);
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn test_env_values() {
        let settings = Settings::from_lookup(
            lookup(&[
                (DOCUMENTS_FOLDER_VAR, "/srv/docs"),
                (ENDPOINT_VAR, "https://translator.example.com"),
                (KEY_VAR, "secret"),
                (PREFERRED_CONTAINERS_VAR, "inbox, ,archive"),
                (CONTAINER_SCAN_LIMIT_VAR, "4"),
                (PARTIAL_MATCHING_VAR, "off"),
                (AMBIGUOUS_PATHS_VAR, "local"),
                (TIMEOUT_VAR, "90"),
            ]),
            &DtlConfig::default(),
        )
        .unwrap();

        assert_eq!(settings.documents_folder, Some(PathBuf::from("/srv/docs")));
        assert_eq!(settings.preferred_containers, vec!["inbox", "archive"]);
        assert_eq!(settings.container_scan_limit, 4);
        assert!(!settings.partial_matching);
        assert_eq!(settings.ambiguous_paths, PathPreference::Local);
        assert_eq!(settings.timeout, Some(Duration::from_secs(90)));
        assert!(settings.missing_translation_vars().is_empty());
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let file = DtlConfig {
            translation_key: Some("from-file".to_string()),
            ..DtlConfig::default()
        };
        let settings = Settings::from_lookup(lookup(&[(KEY_VAR, "  ")]), &file).unwrap();
        assert_eq!(settings.translation_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = Settings::from_lookup(
            lookup(&[(CONTAINER_SCAN_LIMIT_VAR, "lots")]),
            &DtlConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains(CONTAINER_SCAN_LIMIT_VAR));

        let err = Settings::from_lookup(
            lookup(&[(PARTIAL_MATCHING_VAR, "maybe")]),
            &DtlConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains(PARTIAL_MATCHING_VAR));
    }

    #[test]
    fn test_missing_translation_vars() {
        let settings = Settings::from_lookup(
            lookup(&[(ENDPOINT_VAR, "https://translator.example.com")]),
            &DtlConfig::default(),
        )
        .unwrap();
        assert_eq!(settings.missing_translation_vars(), vec![KEY_VAR]);
        assert_eq!(
            Settings::default().missing_translation_vars(),
            vec![ENDPOINT_VAR, KEY_VAR]
        );
    }

    #[test]
    fn test_zero_timeout_disables_budget() {
        let settings =
            Settings::from_lookup(lookup(&[(TIMEOUT_VAR, "0")]), &DtlConfig::default()).unwrap();
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default().with_overrides(&Overrides {
            documents_folder: Some(PathBuf::from("/tmp/in")),
            partial_matching: Some(false),
            timeout_secs: Some(5),
        });
        assert_eq!(settings.documents_folder, Some(PathBuf::from("/tmp/in")));
        assert!(!settings.partial_matching);
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("abcdefghijklmnop"), "abcd****");
    }
}
