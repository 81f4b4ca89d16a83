//! Domain logic - pure release rules independent of git operations

pub mod commit;
pub mod prerelease;
pub mod release;
pub mod tag;
pub mod target;
pub mod version;

pub use commit::{classify, max_severity, CommitSeverity};
pub use prerelease::{Iteration, PreRelease};
pub use release::{ReleaseRecord, VersionInfo};
pub use tag::{tag_name, PlannedTag, TagEntry, TagPlan};
pub use target::TargetDescriptor;
pub use version::Version;
