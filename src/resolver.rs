//! Expands the requested scope into release targets

use crate::domain::TargetDescriptor;
use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use tracing::debug;

/// Resolve requested directories into release targets
///
/// With no directories the whole repository is a single target with the
/// empty package name. Otherwise each directory becomes one target, in
/// input order. A directory that is the repository root is released under
/// the root directory's own name.
///
/// # Arguments
/// * `repo_root` - Work tree root
/// * `working_dir` - Directory relative paths are resolved against
/// * `directories` - Requested directories, possibly empty
pub fn resolve_targets(
    repo_root: &Path,
    working_dir: &Path,
    directories: &[String],
) -> Vec<TargetDescriptor> {
    let root = normalize_path(repo_root);

    if directories.is_empty() {
        debug!(root = %root.display(), "whole repository mode");
        return vec![TargetDescriptor::whole_repository(&root)];
    }

    directories
        .iter()
        .map(|dir| resolve_directory(&root, working_dir, dir))
        .collect()
}

fn resolve_directory(root: &Path, working_dir: &Path, dir: &str) -> TargetDescriptor {
    let unified = dir.replace(['\\', '/'], &MAIN_SEPARATOR.to_string());
    let absolute = normalize_path(&working_dir.join(&unified));
    let trimmed = dir.trim_matches(|c| c == '/' || c == '\\');

    let target = if absolute == root {
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        TargetDescriptor {
            package_name: root_name.clone(),
            directory: root_name,
            repo_relative_path: PathBuf::new(),
            absolute_path: absolute,
            is_root: true,
        }
    } else {
        let package_name = trimmed
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(trimmed)
            .to_string();
        let repo_relative_path = absolute
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        TargetDescriptor {
            package_name,
            directory: trimmed.to_string(),
            repo_relative_path,
            absolute_path: absolute,
            is_root: false,
        }
    };

    debug!(
        requested = dir,
        package = %target.package_name,
        is_root = target.is_root,
        "resolved target"
    );
    target
}

/// Canonical form of a path for comparison
///
/// Existing paths are canonicalized so symlinked temp dirs compare equal;
/// missing paths are cleaned lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| clean_path(path))
}

fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
