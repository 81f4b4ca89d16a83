use std::path::{Path, PathBuf};

/// Scope passed to history queries when the whole tree is in play
pub const WHOLE_TREE_SCOPE: &str = "./";

/// One independently versioned unit: the whole repository or a subdirectory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Tag namespace; empty for the whole-repository package
    pub package_name: String,
    /// Requested directory with surrounding separators trimmed
    pub directory: String,
    /// Directory relative to the repository root (empty for the root itself)
    pub repo_relative_path: PathBuf,
    /// Absolute directory path
    pub absolute_path: PathBuf,
    /// True when the directory is the repository root
    pub is_root: bool,
}

impl TargetDescriptor {
    /// Target covering the whole repository with the empty package name
    pub fn whole_repository(root: &Path) -> Self {
        TargetDescriptor {
            package_name: String::new(),
            directory: String::new(),
            repo_relative_path: PathBuf::new(),
            absolute_path: root.to_path_buf(),
            is_root: true,
        }
    }

    /// Path used to scope history queries
    ///
    /// Root targets scan the whole tree. Other targets use their
    /// repository-relative path, or their absolute path when that is empty.
    pub fn history_scope(&self) -> PathBuf {
        if self.is_root {
            PathBuf::from(WHOLE_TREE_SCOPE)
        } else if self.repo_relative_path.as_os_str().is_empty() {
            self.absolute_path.clone()
        } else {
            self.repo_relative_path.clone()
        }
    }

    /// Name used in logs and summaries
    pub fn display_name(&self) -> &str {
        if self.package_name.is_empty() {
            "(repository)"
        } else {
            &self.package_name
        }
    }
}
