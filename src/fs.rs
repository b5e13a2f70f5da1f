//! File system utilities: atomic writes, sibling naming and scratch files.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::debug;

/// Writes bytes to a file atomically using a temp file and rename.
///
/// This prevents a half-written document if the process is interrupted.
/// The temp file is uniquely named and created in the same directory as the
/// target so the rename stays on one filesystem. An existing file is replaced.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed.
pub fn atomic_write(file_path: &Path, content: &[u8]) -> Result<()> {
    let parent = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = file_path.file_name().unwrap_or_default().to_string_lossy();

    let mut temp = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write {}", temp.path().display()))?;
    temp.as_file().sync_all()?;

    temp.persist(file_path)
        .with_context(|| format!("Failed to move output into place: {}", file_path.display()))?;

    Ok(())
}

/// Inserts `_<suffix>` before the extension of a file or object name.
///
/// `report.pdf` becomes `report_es.pdf`; a name without an extension gets the
/// suffix appended.
pub fn sibling_name(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{name}_{suffix}"),
    }
}

/// Returns the sibling path in the same directory with a language suffix.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(sibling_name(&name, suffix))
}

/// Directory in which per-request temporary files are created.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Uses `root` if given, otherwise the OS temp directory.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a uniquely named scratch file holding `content`.
    ///
    /// The file keeps `extension` (e.g. `.pdf`) so content-type inference on
    /// the local copy still works. It is removed when the returned guard drops.
    pub fn create(&self, extension: &str, content: &[u8]) -> Result<ScratchFile> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create scratch directory: {}", self.root.display())
        })?;

        let mut file = Builder::new()
            .prefix("dtl-")
            .suffix(extension)
            .tempfile_in(&self.root)
            .with_context(|| format!("Failed to create temp file in {}", self.root.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write {}", file.path().display()))?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), bytes = content.len(), "created scratch file");
        Ok(ScratchFile { path: Some(path) })
    }
}

/// A temporary local file deleted when dropped.
///
/// Deletion failures are logged and swallowed so they never mask the outcome
/// of the request that created the file.
#[derive(Debug)]
pub struct ScratchFile {
    path: Option<TempPath>,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            match path.close() {
                Ok(()) => debug!(path = %shown, "removed scratch file"),
                Err(e) => debug!(path = %shown, error = %e, "failed to remove scratch file"),
            }
        }
    }
}
