//! # dtl - Document Translation CLI
//!
//! `dtl` translates PDF and Word documents through a document translation
//! service. Documents can be named loosely and are found on the local
//! filesystem or in blob storage; the translation is written next to the
//! input unless another destination is given.
//!
//! ## Features
//!
//! - **Loose references**: bare filenames, local paths, blob URLs or `container/name`
//! - **Fuzzy lookup**: exact, extension-inferred and partial filename matching
//! - **Mixed storage**: read from one backend and write to the other
//! - **Clean temporaries**: scratch copies are removed on every exit path
//!
//! ## Quick Start
//!
//! ```bash
//! # Find report.pdf in your Documents folder and translate it
//! dtl report.pdf --to spanish --local
//!
//! # Translate a blob and write report_de.pdf next to it
//! dtl documents/report.pdf --to de --storage
//!
//! # Read from storage, write locally
//! dtl https://acct.blob.core.windows.net/docs/memo.docx --to fr -o ./memo_fr.docx
//!
//! # Plain-language request
//! dtl ask "translate invoice from english to german"
//! ```
//!
//! ## Configuration
//!
//! Settings come from flags, the environment (and `.env`), then
//! `~/.config/dtl/config.toml`:
//!
//! ```toml
//! [dtl]
//! documents_folder_path = "/srv/shared/Documents"
//! translation_endpoint = "https://my-translator.cognitiveservices.azure.com"
//! preferred_containers = ["documents", "inbox"]
//! ambiguous_paths = "storage"
//! ```

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and layered settings.
pub mod config;

/// Supported document kinds and resolved sources.
pub mod document;

/// Failure taxonomy and messages.
pub mod error;

/// File system utilities: atomic writes, sibling names, scratch files.
pub mod fs;

/// Documents folder discovery and fuzzy filename matching.
pub mod locate;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Request orchestration from reference to delivered output.
pub mod pipeline;

/// Reference classification.
pub mod reference;

/// Outcome rendering.
pub mod report;

/// Object storage addressing, backends and gateway.
pub mod storage;

/// Document translation backend and language handling.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;
