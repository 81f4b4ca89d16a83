use crate::domain::{classify, CommitSeverity, ReleaseRecord, TargetDescriptor, VersionInfo};
use crate::error::Result;
use crate::git::Repository;
use tracing::{debug, instrument};

/// Turns the commits since a target's last release into its next version
#[derive(Debug, Clone, Default)]
pub struct HistoryAnalyzer {
    pre_release: String,
    build: String,
}

impl HistoryAnalyzer {
    /// Create an analyzer applying the requested pre-release track and build
    pub fn new(pre_release: impl Into<String>, build: impl Into<String>) -> Self {
        HistoryAnalyzer {
            pre_release: pre_release.into(),
            build: build.into(),
        }
    }

    /// Classify `last.commit..HEAD` under the target's scope and bump
    ///
    /// Release notes keep the history order (newest first). No qualifying
    /// commits means `NoRelease` and an unchanged version.
    #[instrument(skip_all, fields(package = %target.display_name(), since = %last.commit))]
    pub fn analyze<R: Repository + ?Sized>(
        &self,
        repo: &R,
        target: &TargetDescriptor,
        last: VersionInfo,
    ) -> Result<ReleaseRecord> {
        let scope = target.history_scope();
        let summaries = repo.commit_summaries(&last.commit, "HEAD", &scope)?;

        let mut severity = CommitSeverity::NoRelease;
        let mut release_notes = Vec::new();

        for line in summaries.into_iter().filter(|line| !line.trim().is_empty()) {
            let line_severity = classify(&line);
            debug!(commit = %line, severity = %line_severity, "classified");
            severity = severity.max(line_severity);
            release_notes.push(line);
        }

        let next_version = last.version.bump(severity, &self.pre_release, &self.build);
        debug!(%severity, from = %last.version, to = %next_version, "computed next version");

        Ok(ReleaseRecord {
            target: target.clone(),
            last,
            next_version,
            severity,
            release_notes,
        })
    }
}
