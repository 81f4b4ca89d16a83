use crate::error::{Result, SemverTagsError};
use crate::git::{Repository, TagRef};
use crate::resolver::normalize_path;
use git2::{Commit, DiffOptions, Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Wrapper around git2::Repository with our trait interface
///
/// Reads go through libgit2. Pushing shells out to the `git` CLI so that the
/// user's credential helpers and `--atomic` are available.
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Discover the repository containing `path`
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            debug!(error = %e, "repository discovery failed");
            SemverTagsError::NotARepository(path.to_path_buf())
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        self.repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| SemverTagsError::history(format!("cannot resolve '{}': {}", rev, e)))
    }

    /// Translate a history scope into a libgit2 pathspec
    ///
    /// `None` means the whole tree.
    fn pathspec_for(&self, scope: &Path) -> Result<Option<String>> {
        let text = scope.to_string_lossy();
        if text.is_empty() || text == "." || text == "./" {
            return Ok(None);
        }

        let relative = if scope.is_absolute() {
            let root = normalize_path(&self.root_path()?);
            let absolute = normalize_path(scope);
            absolute
                .strip_prefix(&root)
                .map(Path::to_path_buf)
                .map_err(|_| {
                    SemverTagsError::history(format!(
                        "path '{}' is outside the repository at '{}'",
                        scope.display(),
                        root.display()
                    ))
                })?
        } else {
            scope.to_path_buf()
        };

        let spec = relative
            .to_string_lossy()
            .replace('\\', "/")
            .trim_start_matches("./")
            .trim_matches('/')
            .to_string();

        if spec.is_empty() || spec == "." {
            Ok(None)
        } else {
            Ok(Some(spec))
        }
    }

    /// Whether `commit` changes anything under `pathspec`
    ///
    /// A commit identical to any of its parents inside the scope is skipped,
    /// which for merges keeps only those that brought their own changes.
    fn touches(
        &self,
        commit: &Commit<'_>,
        pathspec: Option<&str>,
    ) -> std::result::Result<bool, git2::Error> {
        let tree = commit.tree()?;
        let mut options = DiffOptions::new();
        if let Some(spec) = pathspec {
            options.pathspec(spec);
        }

        if commit.parent_count() == 0 {
            let diff = self
                .repo
                .diff_tree_to_tree(None, Some(&tree), Some(&mut options))?;
            return Ok(diff.deltas().len() > 0);
        }

        for parent in commit.parents() {
            let parent_tree = parent.tree()?;
            let diff =
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut options))?;
            if diff.deltas().len() == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Repository for Git2Repository {
    fn is_inside_repository(&self) -> bool {
        !self.repo.is_bare() && self.repo.workdir().is_some()
    }

    fn root_path(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| SemverTagsError::NotARepository(self.repo.path().to_path_buf()))
    }

    #[instrument(skip(self))]
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let names = self
            .repo
            .tag_names(None)
            .map_err(|e| SemverTagsError::history(format!("cannot list tags: {}", e)))?;

        let mut dated = Vec::new();
        for name in names.iter().flatten() {
            let commit = self
                .repo
                .find_reference(&format!("refs/tags/{}", name))
                .and_then(|reference| reference.peel_to_commit())
                .map_err(|e| {
                    SemverTagsError::history(format!("cannot resolve tag '{}': {}", name, e))
                })?;

            dated.push((
                commit.committer().when().seconds(),
                TagRef::new(name, commit.id().to_string()),
            ));
        }

        // Stable: equal timestamps keep libgit2's name order
        dated.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(count = dated.len(), "listed all tags");
        Ok(dated.into_iter().map(|(_, tag)| tag).collect())
    }

    #[instrument(skip(self))]
    fn first_root_commit(&self) -> Result<String> {
        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| SemverTagsError::root_commit(e.to_string()))?;
        revwalk
            .set_sorting(Sort::TIME)
            .and_then(|_| revwalk.push_head())
            .map_err(|e| SemverTagsError::root_commit(e.to_string()))?;

        for oid in revwalk {
            let oid = oid.map_err(|e| SemverTagsError::root_commit(e.to_string()))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| SemverTagsError::root_commit(e.to_string()))?;
            if commit.parent_count() == 0 {
                debug!(commit = %oid, "found root commit");
                return Ok(oid.to_string());
            }
        }

        Err(SemverTagsError::root_commit(
            "no parentless commit is reachable from HEAD",
        ))
    }

    fn head_commit(&self) -> Result<String> {
        self.repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map(|commit| commit.id().to_string())
            .map_err(|e| SemverTagsError::history(format!("cannot resolve HEAD: {}", e)))
    }

    #[instrument(skip(self), fields(scope = %path_scope.display()))]
    fn commit_summaries(
        &self,
        since: &str,
        until: &str,
        path_scope: &Path,
    ) -> Result<Vec<String>> {
        let until_oid = self.resolve_commit(until)?;
        let since_oid = self.resolve_commit(since)?;
        let pathspec = self.pathspec_for(path_scope)?;

        let query = |e: git2::Error| {
            SemverTagsError::history(format!("cannot walk {}..{}: {}", since, until, e))
        };

        let mut revwalk = self.repo.revwalk().map_err(query)?;
        revwalk.set_sorting(Sort::TIME).map_err(query)?;
        revwalk.push(until_oid).map_err(query)?;
        revwalk.hide(since_oid).map_err(query)?;

        let mut summaries = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(query)?;
            let commit = self.repo.find_commit(oid).map_err(query)?;
            if self.touches(&commit, pathspec.as_deref()).map_err(query)? {
                let summary = commit.summary_bytes().unwrap_or_default();
                summaries.push(String::from_utf8_lossy(summary).into_owned());
            }
        }

        debug!(count = summaries.len(), pathspec = ?pathspec, "collected commit summaries");
        Ok(summaries)
    }

    #[instrument(skip(self))]
    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| SemverTagsError::tag_creation(name, e.message()))?;

        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .map_err(|e| SemverTagsError::tag_creation(name, e.message()))?;

        info!(tag = name, commit = %head.id(), "created tag");
        Ok(())
    }

    #[instrument(skip(self))]
    fn push_tags(
        &self,
        remote: &str,
        branch: &str,
        tag_names: &[&str],
        atomic: bool,
    ) -> Result<()> {
        let workdir = self.root_path()?;

        let mut args = vec!["push"];
        if atomic {
            args.push("--atomic");
        }
        args.push(remote);
        args.push(branch);
        args.extend_from_slice(tag_names);

        let start = Instant::now();
        let output = Command::new("git")
            .args(&args)
            .current_dir(&workdir)
            .output()
            .map_err(|e| SemverTagsError::push(format!("cannot run git: {}", e), "", ""))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        info!(
            remote,
            branch,
            tags = tag_names.len(),
            duration_ms = start.elapsed().as_millis(),
            success = output.status.success(),
            "git push (CLI)"
        );

        if !output.status.success() {
            warn!(%stderr, "push rejected");
            return Err(SemverTagsError::push(
                format!("git push exited with {}", output.status),
                stdout,
                stderr,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Git2Repo, path: &str, message: &str, time: i64) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        let full_path = workdir.join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(&full_path, format!("{}\n", message)).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::new("Test", "test@example.com", &Time::new(time, 0)).unwrap();
        let parents: Vec<Commit<'_>> = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn setup_repo() -> (TempDir, Git2Repo, Vec<Oid>) {
        let temp = TempDir::new().unwrap();
        let repo = Git2Repo::init(temp.path()).unwrap();
        let oids = vec![
            commit_file(&repo, "README.md", "chore: init", 1_700_000_000),
            commit_file(&repo, "api/lib.rs", "feat(api): add endpoint", 1_700_000_100),
            commit_file(&repo, "web/app.js", "fix(web): button", 1_700_000_200),
            commit_file(&repo, "api/lib.rs", "fix(api): typo", 1_700_000_300),
        ];
        (temp, repo, oids)
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        let result = Git2Repository::discover(temp.path());
        assert!(matches!(result, Err(SemverTagsError::NotARepository(_))));
    }

    #[test]
    fn test_is_inside_repository() {
        let (temp, _repo, _) = setup_repo();
        let repo = Git2Repository::discover(temp.path().join("api")).unwrap();
        assert!(repo.is_inside_repository());
    }

    #[test]
    fn test_first_root_commit() {
        let (temp, _repo, oids) = setup_repo();
        let repo = Git2Repository::discover(temp.path()).unwrap();
        assert_eq!(repo.first_root_commit().unwrap(), oids[0].to_string());
        assert_eq!(repo.head_commit().unwrap(), oids[3].to_string());
    }

    #[test]
    fn test_list_tags_newest_commit_first() {
        let (_temp, raw, oids) = setup_repo();
        {
            let first = raw.find_object(oids[0], None).unwrap();
            let third = raw.find_object(oids[2], None).unwrap();
            raw.tag_lightweight("v0.1.0", &first, false).unwrap();
            raw.tag_lightweight("web/v0.1.1", &third, false).unwrap();
        }

        let repo = Git2Repository::from_git2(raw);
        let tags = repo.list_tags().unwrap();
        assert_eq!(
            tags,
            vec![
                TagRef::new("web/v0.1.1", oids[2].to_string()),
                TagRef::new("v0.1.0", oids[0].to_string()),
            ]
        );
    }

    #[test]
    fn test_commit_summaries_whole_tree_newest_first() {
        let (temp, _raw, oids) = setup_repo();
        let repo = Git2Repository::discover(temp.path()).unwrap();
        let summaries = repo
            .commit_summaries(&oids[0].to_string(), "HEAD", Path::new("./"))
            .unwrap();
        assert_eq!(
            summaries,
            vec!["fix(api): typo", "fix(web): button", "feat(api): add endpoint"]
        );
    }

    #[test]
    fn test_commit_summaries_scoped_to_directory() {
        let (temp, _raw, oids) = setup_repo();
        let repo = Git2Repository::discover(temp.path()).unwrap();
        let summaries = repo
            .commit_summaries(&oids[0].to_string(), "HEAD", Path::new("api"))
            .unwrap();
        assert_eq!(summaries, vec!["fix(api): typo", "feat(api): add endpoint"]);
    }

    #[test]
    fn test_commit_summaries_absolute_scope() {
        let (temp, _raw, oids) = setup_repo();
        let repo = Git2Repository::discover(temp.path()).unwrap();
        let summaries = repo
            .commit_summaries(&oids[1].to_string(), "HEAD", &temp.path().join("web"))
            .unwrap();
        assert_eq!(summaries, vec!["fix(web): button"]);
    }

    #[test]
    fn test_commit_summaries_keep_non_utf8_subjects() {
        let (temp, raw, oids) = setup_repo();
        let head = raw.head().unwrap().peel_to_commit().unwrap();

        fs::write(temp.path().join("menu.txt"), "menu\n").unwrap();
        let mut index = raw.index().unwrap();
        index.add_path(Path::new("menu.txt")).unwrap();
        let tree = index.write_tree().unwrap();

        let mut raw_commit = format!(
            "tree {}\nparent {}\nauthor Test <test@example.com> 1700000400 +0000\ncommitter Test <test@example.com> 1700000400 +0000\n\n",
            tree,
            head.id()
        )
        .into_bytes();
        raw_commit.extend_from_slice(b"fix: caf\xe9 menu\n");
        let oid = raw
            .odb()
            .unwrap()
            .write(git2::ObjectType::Commit, &raw_commit)
            .unwrap();
        let head_ref = raw.head().unwrap().name().unwrap().to_string();
        raw.reference(&head_ref, oid, true, "latin-1 commit").unwrap();

        let repo = Git2Repository::discover(temp.path()).unwrap();
        let summaries = repo
            .commit_summaries(&oids[3].to_string(), "HEAD", Path::new("./"))
            .unwrap();
        assert_eq!(summaries, vec!["fix: caf\u{FFFD} menu"]);
    }

    #[test]
    fn test_commit_summaries_unknown_revision() {
        let (temp, _raw, _) = setup_repo();
        let repo = Git2Repository::discover(temp.path()).unwrap();
        let result = repo.commit_summaries("does-not-exist", "HEAD", Path::new("./"));
        assert!(matches!(result, Err(SemverTagsError::HistoryQuery(_))));
    }

    #[test]
    fn test_create_tag_at_head() {
        let (_temp, raw, oids) = setup_repo();
        let repo = Git2Repository::from_git2(raw);
        repo.create_tag("api/v0.2.0").unwrap();

        let tags = repo.list_tags().unwrap();
        assert_eq!(tags, vec![TagRef::new("api/v0.2.0", oids[3].to_string())]);
    }

    #[test]
    fn test_create_existing_tag_fails() {
        let (_temp, raw, _) = setup_repo();
        let repo = Git2Repository::from_git2(raw);
        repo.create_tag("v1.0.0").unwrap();
        let result = repo.create_tag("v1.0.0");
        assert!(matches!(result, Err(SemverTagsError::TagCreation { .. })));
    }

    #[test]
    fn test_push_without_remote_fails() {
        let (_temp, raw, _) = setup_repo();
        let repo = Git2Repository::from_git2(raw);
        let result = repo.push_tags("nowhere", "main", &["v1.0.0"], true);
        assert!(matches!(result, Err(SemverTagsError::Push { .. })));
    }
}
