#![allow(clippy::unwrap_used)]
//! Config priority contract tests.
//!
//! Priority order (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults

use serial_test::serial;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use dtl_cli::config::{ConfigManager, DtlConfig, Overrides, Settings};
use dtl_cli::reference::PathPreference;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn file_config() -> DtlConfig {
    DtlConfig {
        documents_folder_path: Some(PathBuf::from("/from/file")),
        translation_endpoint: Some("https://file.example.com".to_string()),
        translation_key: Some("file-key".to_string()),
        preferred_containers: Some(vec!["archive".to_string()]),
        container_scan_limit: Some(2),
        partial_matching: Some(false),
        ambiguous_paths: Some(PathPreference::Local),
        timeout_secs: Some(30),
        ..DtlConfig::default()
    }
}

#[test]
fn test_file_overrides_defaults() {
    let settings = Settings::from_lookup(env(&[]), &file_config()).unwrap();

    assert_eq!(settings.documents_folder, Some(PathBuf::from("/from/file")));
    assert_eq!(settings.preferred_containers, vec!["archive"]);
    assert_eq!(settings.container_scan_limit, 2);
    assert!(!settings.partial_matching);
    assert_eq!(settings.ambiguous_paths, PathPreference::Local);
    assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
}

#[test]
fn test_env_overrides_file() {
    let settings = Settings::from_lookup(
        env(&[
            ("DOCUMENTS_FOLDER_PATH", "/from/env"),
            ("AZURE_DOCUMENT_TRANSLATION_KEY", "env-key"),
            ("DTL_PARTIAL_MATCHING", "true"),
            ("DTL_AMBIGUOUS_PATHS", "storage"),
        ]),
        &file_config(),
    )
    .unwrap();

    assert_eq!(settings.documents_folder, Some(PathBuf::from("/from/env")));
    assert_eq!(settings.translation_key.as_deref(), Some("env-key"));
    // Not set in the environment, so the file value stays
    assert_eq!(
        settings.translation_endpoint.as_deref(),
        Some("https://file.example.com")
    );
    assert!(settings.partial_matching);
    assert_eq!(settings.ambiguous_paths, PathPreference::Storage);
}

#[test]
fn test_cli_overrides_env_and_file() {
    let settings = Settings::from_lookup(
        env(&[("DOCUMENTS_FOLDER_PATH", "/from/env"), ("DTL_TIMEOUT_SECS", "10")]),
        &file_config(),
    )
    .unwrap()
    .with_overrides(&Overrides {
        documents_folder: Some(PathBuf::from("/from/cli")),
        partial_matching: None,
        timeout_secs: Some(0),
    });

    assert_eq!(settings.documents_folder, Some(PathBuf::from("/from/cli")));
    // An override of zero disables the budget
    assert_eq!(settings.timeout, None);
    // Untouched by overrides
    assert!(!settings.partial_matching);
}

#[test]
fn test_saved_file_feeds_settings() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_path(temp.path().join("config.toml"));
    manager
        .save(&dtl_cli::config::ConfigFile { dtl: file_config() })
        .unwrap();

    let loaded = manager.load_if_exists().unwrap();
    let settings = Settings::from_lookup(env(&[]), &loaded.dtl).unwrap();
    assert_eq!(settings.container_scan_limit, 2);
    assert!(settings.missing_translation_vars().is_empty());
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    // SAFETY: serialized with the other environment tests
    unsafe {
        std::env::set_var("DTL_CONTAINER_SCAN_LIMIT", "7");
        std::env::remove_var("DTL_PREFERRED_CONTAINERS");
    }

    let settings = Settings::from_env(&DtlConfig::default()).unwrap();

    unsafe {
        std::env::remove_var("DTL_CONTAINER_SCAN_LIMIT");
    }

    assert_eq!(settings.container_scan_limit, 7);
    assert_eq!(
        settings.preferred_containers,
        vec!["documents", "files", "source", "input", "uploads"]
    );
}
