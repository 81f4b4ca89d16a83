use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for semver-tags operations
///
/// Every variant is terminal for a run: nothing in the crate retries.
#[derive(Error, Debug)]
pub enum SemverTagsError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Cannot parse tag line '{line}': {reason}")]
    TagParse { line: String, reason: String },

    #[error("Version parsing error: {0}")]
    VersionParse(String),

    #[error("History query failed: {0}")]
    HistoryQuery(String),

    #[error("Cannot find a root commit: {0}")]
    RootCommit(String),

    #[error("Failed to create tag '{tag}': {reason}")]
    TagCreation { tag: String, reason: String },

    #[error("Failed to push tags: {reason}\n{stdout}\n{stderr}")]
    Push {
        reason: String,
        stdout: String,
        stderr: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in semver-tags
pub type Result<T> = std::result::Result<T, SemverTagsError>;

impl SemverTagsError {
    /// Create a tag line parse error
    pub fn tag_parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        SemverTagsError::TagParse {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Create a version parse error with context
    pub fn version(msg: impl Into<String>) -> Self {
        SemverTagsError::VersionParse(msg.into())
    }

    /// Create a history query error carrying the collaborator's diagnostic
    pub fn history(msg: impl Into<String>) -> Self {
        SemverTagsError::HistoryQuery(msg.into())
    }

    /// Create a root commit lookup error
    pub fn root_commit(msg: impl Into<String>) -> Self {
        SemverTagsError::RootCommit(msg.into())
    }

    /// Create a tag creation error
    pub fn tag_creation(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        SemverTagsError::TagCreation {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create a push error with both captured output streams
    pub fn push(
        reason: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        SemverTagsError::Push {
            reason: reason.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        SemverTagsError::Config(msg.into())
    }

    /// Create an output sink error with context
    pub fn output(msg: impl Into<String>) -> Self {
        SemverTagsError::Output(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SemverTagsError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SemverTagsError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_a_repository_names_path() {
        let err = SemverTagsError::NotARepository(PathBuf::from("/tmp/nowhere"));
        assert_eq!(err.to_string(), "Not a git repository: /tmp/nowhere");
    }

    #[test]
    fn test_tag_parse_includes_line_and_reason() {
        let err = SemverTagsError::tag_parse("release-1,abc", "invalid format");
        let msg = err.to_string();
        assert!(msg.contains("release-1,abc"));
        assert!(msg.contains("invalid format"));
    }

    #[test]
    fn test_push_error_carries_both_streams() {
        let err = SemverTagsError::push("exit status 1", "Everything up-to-date", "rejected");
        let msg = err.to_string();
        assert!(msg.contains("exit status 1"));
        assert!(msg.contains("Everything up-to-date"));
        assert!(msg.contains("rejected"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (SemverTagsError::version("x"), "Version parsing error"),
            (SemverTagsError::history("x"), "History query failed"),
            (SemverTagsError::root_commit("x"), "Cannot find a root commit"),
            (SemverTagsError::tag_creation("v1.0.0", "x"), "Failed to create tag 'v1.0.0'"),
            (SemverTagsError::output("x"), "Output error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
