//! Filename matching inside a single directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::document::{SUPPORTED_EXTENSIONS, is_supported_name};

/// Minimum longest-common-substring length accepted for a partial match.
pub const MIN_PARTIAL_SCORE: usize = 3;

/// Cap on "did you mean" suggestions.
pub const MAX_SUGGESTIONS: usize = 3;

/// Cap on files listed when there are no close suggestions.
pub const MAX_LISTED_FILES: usize = 5;

/// Which matching rule selected a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Extension,
    Partial { score: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub path: PathBuf,
    pub stage: MatchStage,
}

/// Hints shown when a filename could not be matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    /// Files whose names contain the search term or vice versa.
    pub similar: Vec<String>,
    /// Leading supported files in the directory.
    pub available: Vec<String>,
    /// Total number of supported files in the directory.
    pub total_available: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    partial_matching: bool,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FuzzyMatcher {
    pub const fn new(partial_matching: bool) -> Self {
        Self { partial_matching }
    }

    /// Finds the best file for `filename` in `directory`.
    ///
    /// Stages run in order and the first hit wins: case-insensitive exact
    /// name, extension-inferred name, then (if enabled) partial match scored
    /// by longest common substring. Entries are visited sorted by name.
    pub fn find(&self, filename: &str, directory: &Path) -> io::Result<Option<FileMatch>> {
        let entries = sorted_files(directory)?;

        if let Some((_, path)) = entries.iter().find(|(name, _)| matches_exactly(name, filename)) {
            debug!(path = %path.display(), "exact match");
            return Ok(Some(FileMatch {
                path: path.clone(),
                stage: MatchStage::Exact,
            }));
        }

        if let Some((_, path)) = entries
            .iter()
            .find(|(name, _)| matches_with_extension(name, filename))
        {
            debug!(path = %path.display(), "extension-inferred match");
            return Ok(Some(FileMatch {
                path: path.clone(),
                stage: MatchStage::Extension,
            }));
        }

        if !self.partial_matching {
            return Ok(None);
        }

        let found = best_partial(filename, &entries);
        if let Some(ref m) = found {
            debug!(path = %m.path.display(), stage = ?m.stage, "partial match");
        }
        Ok(found)
    }

    /// Builds suggestions from the supported files in `directory`.
    pub fn suggestions(&self, filename: &str, directory: &Path) -> Suggestions {
        let files: Vec<String> = list_supported_files(directory)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        let wanted = filename.to_lowercase();
        let similar = files
            .iter()
            .filter(|name| {
                let name = name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect();

        Suggestions {
            similar,
            available: files.iter().take(MAX_LISTED_FILES).cloned().collect(),
            total_available: files.len(),
        }
    }
}

/// Case-insensitive equality of two file names.
pub fn matches_exactly(candidate: &str, wanted: &str) -> bool {
    candidate.to_lowercase() == wanted.to_lowercase()
}

/// Extension-inferred equality.
///
/// Without an extension, `wanted` matches `wanted` plus any supported
/// extension. With one, the stems must match and the candidate's extension
/// must be supported.
pub fn matches_with_extension(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let wanted = wanted.to_lowercase();

    match wanted.rsplit_once('.') {
        None => SUPPORTED_EXTENSIONS
            .iter()
            .any(|ext| candidate.strip_suffix(ext) == Some(wanted.as_str())),
        Some((wanted_stem, _)) => {
            stem(&candidate) == wanted_stem && is_supported_name(&candidate)
        }
    }
}

/// Length in characters of the longest common substring.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous = vec![0usize; b.len() + 1];
    let mut best = 0;

    for ca in a.chars() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == *cb {
                current[j + 1] = previous[j] + 1;
                best = best.max(current[j + 1]);
            }
        }
        previous = current;
    }

    best
}

/// Supported files in `directory` as `(name, path)`, sorted case-insensitively.
pub fn list_supported_files(directory: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files: Vec<_> = sorted_files(directory)?
        .into_iter()
        .filter(|(name, _)| is_supported_name(name))
        .collect();
    files.sort_by_key(|(name, _)| name.to_lowercase());
    Ok(files)
}

fn best_partial(filename: &str, entries: &[(String, PathBuf)]) -> Option<FileMatch> {
    let wanted = filename.to_lowercase();
    let wanted_stem = stem(&wanted);

    let mut best: Option<(usize, &PathBuf)> = None;
    for (name, path) in entries.iter().filter(|(name, _)| is_supported_name(name)) {
        let name = name.to_lowercase();
        let candidate_stem = stem(&name);
        if !(candidate_stem.contains(wanted_stem) || wanted_stem.contains(candidate_stem)) {
            continue;
        }

        let score = longest_common_substring(wanted_stem, candidate_stem);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, path));
        }
    }

    best.filter(|(score, _)| *score >= MIN_PARTIAL_SCORE)
        .map(|(score, path)| FileMatch {
            path: path.clone(),
            stage: MatchStage::Partial { score },
        })
}

/// Regular files in `directory` as `(name, path)`, sorted by name.
fn sorted_files(directory: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name() {
            files.push((name.to_string_lossy().into_owned(), path));
        }
    }
    files.sort();
    Ok(files)
}

fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}
