//! Shows the resolved configuration and initializes the config file.

use anyhow::Result;

use crate::config::{
    AMBIGUOUS_PATHS_VAR, CONTAINER_SCAN_LIMIT_VAR, ConfigFile, ConfigManager,
    DOCUMENTS_FOLDER_VAR, PARTIAL_MATCHING_VAR, PREFERRED_CONTAINERS_VAR, SCRATCH_DIR_VAR,
    Settings, TIMEOUT_VAR, mask_secret,
};
use crate::storage::{ACCOUNT_KEY_VAR, ACCOUNT_NAME_VAR, CONNECTION_STRING_VAR};
use crate::translation::{ENDPOINT_VAR, KEY_VAR};
use crate::ui::Style;

/// Prints every setting with secrets masked.
///
/// With `init`, an empty config file is written first if none exists.
pub fn run_config(init: bool, settings: &Settings) -> Result<()> {
    let manager = ConfigManager::new()?;

    if init {
        if manager.exists() {
            println!(
                "{} {}",
                Style::secondary("Config file already exists:"),
                manager.config_path().display()
            );
        } else {
            manager.save(&ConfigFile::default())?;
            println!(
                "{} Created {}",
                Style::success("✓"),
                Style::value(manager.config_path().display())
            );
        }
        println!();
    }

    println!("{}", Style::header("Configuration"));
    let state = if manager.exists() { "" } else { " (not created)" };
    println!(
        "  {} {}{}",
        Style::label("file"),
        manager.config_path().display(),
        Style::secondary(state)
    );
    println!();

    let optional = |value: Option<String>| value.unwrap_or_else(|| Style::secondary("(not set)"));
    let secret = |value: Option<&String>| optional(value.map(|v| mask_secret(v)));

    print_setting(
        DOCUMENTS_FOLDER_VAR,
        optional(settings.documents_folder.as_ref().map(|p| p.display().to_string())),
    );
    print_setting(ENDPOINT_VAR, optional(settings.translation_endpoint.clone()));
    print_setting(KEY_VAR, secret(settings.translation_key.as_ref()));
    print_setting(
        CONNECTION_STRING_VAR,
        secret(settings.storage_connection_string.as_ref()),
    );
    print_setting(ACCOUNT_NAME_VAR, optional(settings.storage_account_name.clone()));
    print_setting(ACCOUNT_KEY_VAR, secret(settings.storage_account_key.as_ref()));
    print_setting(PREFERRED_CONTAINERS_VAR, settings.preferred_containers.join(","));
    print_setting(
        CONTAINER_SCAN_LIMIT_VAR,
        settings.container_scan_limit.to_string(),
    );
    print_setting(PARTIAL_MATCHING_VAR, settings.partial_matching.to_string());
    print_setting(AMBIGUOUS_PATHS_VAR, settings.ambiguous_paths.to_string());
    print_setting(
        SCRATCH_DIR_VAR,
        optional(settings.scratch_dir.as_ref().map(|p| p.display().to_string())),
    );
    print_setting(
        TIMEOUT_VAR,
        optional(settings.timeout.map(|t| t.as_secs().to_string())),
    );

    Ok(())
}

fn print_setting(key: &str, value: String) {
    println!("  {} {value}", Style::label(format!("{key:37}")));
}
