//! Version-control collaborator
//!
//! The release engine never touches git directly. It talks to the
//! [Repository] trait, which has two implementations:
//!
//! - [repository::Git2Repository]: a real repository opened with `git2`,
//!   pushing through the `git` CLI
//! - [mock::MockRepository]: an in-memory fake for tests
//!
//! ```rust
//! # use semver_tags::git::Repository;
//! # use std::path::Path;
//! # fn example<R: Repository>(repo: &R) -> semver_tags::Result<()> {
//! let tags = repo.list_tags()?;
//! let root = repo.first_root_commit()?;
//! let since = tags.first().map(|t| t.object_hash.as_str()).unwrap_or(root.as_str());
//! let _summaries = repo.commit_summaries(since, "HEAD", Path::new("./"))?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockRepository, PushCall};
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// An existing tag as reported by the collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Short tag name, e.g. `api/v1.2.0`
    pub ref_name: String,
    /// Commit the tag points at
    pub object_hash: String,
}

impl TagRef {
    pub fn new(ref_name: impl Into<String>, object_hash: impl Into<String>) -> Self {
        TagRef {
            ref_name: ref_name.into(),
            object_hash: object_hash.into(),
        }
    }
}

/// Git operations the release engine needs
///
/// All calls are synchronous. Implementations map their own failures onto
/// [crate::error::SemverTagsError] variants: history reads to
/// `HistoryQuery`, root lookups to `RootCommit`, tagging to `TagCreation`
/// and pushing to `Push`.
pub trait Repository {
    /// Whether the collaborator is operating inside a work tree
    fn is_inside_repository(&self) -> bool;

    /// Absolute path of the work tree root
    fn root_path(&self) -> Result<PathBuf>;

    /// All tags, ordered by the tagged commit's committer time, newest first
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Id of the first parentless commit reachable from HEAD
    fn first_root_commit(&self) -> Result<String>;

    /// Id of the commit HEAD points at
    fn head_commit(&self) -> Result<String>;

    /// Summary lines of commits in `since..until` touching `path_scope`
    ///
    /// Newest first. `./` scopes to the whole tree; absolute paths are
    /// interpreted relative to the work tree root.
    fn commit_summaries(&self, since: &str, until: &str, path_scope: &Path)
        -> Result<Vec<String>>;

    /// Create a lightweight tag at HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push `branch` and the given tags to `remote` in one operation
    fn push_tags(&self, remote: &str, branch: &str, tag_names: &[&str], atomic: bool)
        -> Result<()>;
}
