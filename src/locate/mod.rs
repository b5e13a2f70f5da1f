//! Local document discovery: candidate folders and filename matching.

mod directories;
mod matcher;

pub use directories::{
    DirectoryCandidate, DirectoryLocator, HostEnvironment, Platform, is_valid_directory,
};
pub use matcher::{
    FileMatch, FuzzyMatcher, MAX_LISTED_FILES, MAX_SUGGESTIONS, MIN_PARTIAL_SCORE, MatchStage,
    Suggestions, list_supported_files, longest_common_substring, matches_exactly,
    matches_with_extension,
};
