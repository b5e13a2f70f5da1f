//! Process-wide output settings.
//!
//! Results go to stdout so they can be piped; status lines, the spinner and
//! logs go to stderr. In JSON mode stdout carries only the JSON document and
//! status output is suppressed as in quiet mode.

use std::io::IsTerminal;
use std::sync::OnceLock;

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub no_color: bool,
    pub json: bool,
}

impl OutputConfig {
    /// Builds the config from command-line flags.
    ///
    /// Colors are also disabled by `NO_COLOR` (https://no-color.org/).
    pub fn from_flags(quiet: bool, no_color: bool, json: bool) -> Self {
        Self {
            quiet,
            no_color: no_color || std::env::var_os("NO_COLOR").is_some(),
            json,
        }
    }
}

/// Sets the process-wide config. Only the first call has any effect.
pub fn init(config: OutputConfig) {
    let _ = OUTPUT.set(config);
}

pub fn config() -> &'static OutputConfig {
    OUTPUT.get_or_init(|| OutputConfig::from_flags(false, false, false))
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

pub fn is_json() -> bool {
    config().json
}

/// Whether status lines and the spinner should be drawn.
pub fn shows_status() -> bool {
    let config = config();
    !config.quiet && !config.json && std::io::stderr().is_terminal()
}

/// Writes a rendered result: successes to stdout, failures to stderr.
pub fn emit_result(message: &str, success: bool) {
    if success {
        println!("{message}");
    } else {
        eprintln!("{message}");
    }
}

/// Print a status message to stderr unless quiet or JSON output is on.
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() && !$crate::output::is_json() {
            eprintln!($($arg)*);
        }
    };
}
