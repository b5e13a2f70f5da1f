use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::reference::ResolutionMode;

#[derive(Parser, Debug)]
#[command(name = "dtl")]
#[command(about = "Translate documents from local folders or blob storage")]
#[command(version)]
pub struct Args {
    /// Document to translate: a filename, a local path, a blob URL or container/name
    #[arg(requires = "to")]
    pub reference: Option<String>,

    /// Target language name or code (e.g., spanish, es)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Source language name or code
    #[arg(short = 'f', long = "from", default_value = "auto")]
    pub from: String,

    /// Where to write the translation (defaults to <name>_<lang>.<ext> next to the input)
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags that choose where references are resolved.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Resolve the document through blob storage
    #[arg(long, conflicts_with = "local")]
    pub storage: bool,

    /// Resolve the document on the local filesystem
    #[arg(long)]
    pub local: bool,

    /// Only search this container for bare filenames
    #[arg(short = 'c', long)]
    pub container: Option<String>,
}

impl LocationArgs {
    pub const fn mode(&self) -> ResolutionMode {
        ResolutionMode::from_flags(self.storage, self.local)
    }
}

/// Options accepted by every command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Documents folder searched first for bare filenames
    #[arg(long, global = true, value_name = "DIR")]
    pub documents_dir: Option<PathBuf>,

    /// Disable partial filename matching
    #[arg(long, global = true)]
    pub no_partial: bool,

    /// Give up on backend calls after this many seconds (0 waits forever)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            documents_folder: self.documents_dir.clone(),
            partial_matching: self.no_partial.then_some(false),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List supported language names and codes
    Languages,
    /// List translatable files in the documents folder or a container
    Files {
        /// List this blob container instead of the local folder
        #[arg(short = 'c', long)]
        container: Option<String>,
    },
    /// Show where documents are searched for and which backends are configured
    Doctor,
    /// Translate from a request such as "translate report.pdf to spanish"
    Ask {
        /// The request sentence
        request: String,

        #[command(flatten)]
        location: LocationArgs,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Config {
        /// Write an empty config file if none exists
        #[arg(long)]
        init: bool,
    },
}
