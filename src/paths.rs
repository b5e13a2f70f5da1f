//! Location of the dtl config directory.
//!
//! XDG layout is used on every platform so the config file is found in the
//! same place on macOS and Linux.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dtl";

/// Returns the configuration directory for dtl.
///
/// `$XDG_CONFIG_HOME/dtl` when the variable is set and non-empty, otherwise
/// `~/.config/dtl`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor a home directory is available.
pub fn config_dir() -> Result<PathBuf> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    resolve_config_dir(xdg.as_deref(), dirs::home_dir().as_deref())
        .context("Failed to determine home directory")
}

fn resolve_config_dir(xdg: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    match xdg {
        Some(xdg) if !xdg.as_os_str().is_empty() => Some(xdg.join(APP_DIR)),
        _ => home.map(|home| home.join(".config").join(APP_DIR)),
    }
}
