use crate::domain::commit::CommitSeverity;
use crate::domain::tag::tag_name;
use crate::domain::target::TargetDescriptor;
use crate::domain::version::Version;

/// A version bound to the commit it was released from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub package: String,
    pub version: Version,
    pub commit: String,
}

/// Computed release state for one target
///
/// Filled by the last-version lookup, then by the history analyzer; read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub target: TargetDescriptor,
    pub last: VersionInfo,
    pub next_version: Version,
    pub severity: CommitSeverity,
    /// Summary lines in history order, newest first
    pub release_notes: Vec<String>,
}

impl ReleaseRecord {
    /// True when the next version renders differently from the last one
    pub fn is_changed(&self) -> bool {
        !self.next_version.same_release_as(&self.last.version)
    }

    pub fn package(&self) -> &str {
        &self.last.package
    }

    pub fn next_tag(&self) -> String {
        tag_name(self.package(), &self.next_version)
    }

    pub fn last_tag(&self) -> String {
        tag_name(self.package(), &self.last.version)
    }
}
