//! Subcommand implementations.

use anyhow::Result;

use crate::config::{ConfigManager, Overrides, Settings};

/// Natural-language request handler.
pub mod ask;

/// Configuration display and initialization.
pub mod config;

/// System diagnostics.
pub mod doctor;

/// Translatable file listing.
pub mod files;

/// Translation command handler.
pub mod translate;

/// Loads settings from the config file and environment, then applies `overrides`.
pub fn load_settings(overrides: &Overrides) -> Result<Settings> {
    let manager = ConfigManager::new()?;
    let file = manager.load_if_exists()?;
    Ok(Settings::from_env(&file.dtl)?.with_overrides(overrides))
}
