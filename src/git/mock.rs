use crate::error::{Result, SemverTagsError};
use crate::git::{Repository, TagRef};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A push request captured by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCall {
    pub remote: String,
    pub branch: String,
    pub tags: Vec<String>,
    pub atomic: bool,
}

/// In-memory repository for exercising the release engine without git
///
/// History is registered per `(since, scope)` pair; unregistered ranges
/// are empty. Tag creation and pushes are recorded, and either can be made
/// to fail.
pub struct MockRepository {
    inside: bool,
    root: PathBuf,
    tags: Vec<TagRef>,
    root_commit: Option<String>,
    head: String,
    histories: HashMap<(String, PathBuf), Vec<String>>,
    failing_tag: Option<String>,
    push_failure: Option<(String, String)>,
    created_tags: RefCell<Vec<String>>,
    pushes: RefCell<Vec<PushCall>>,
    tag_listings: Cell<usize>,
}

impl MockRepository {
    /// Create an empty mock repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            inside: true,
            root: root.into(),
            tags: Vec::new(),
            root_commit: None,
            head: "HEAD".to_string(),
            histories: HashMap::new(),
            failing_tag: None,
            push_failure: None,
            created_tags: RefCell::new(Vec::new()),
            pushes: RefCell::new(Vec::new()),
            tag_listings: Cell::new(0),
        }
    }

    /// Pretend the working directory is not inside a repository
    pub fn set_outside_repository(&mut self) {
        self.inside = false;
    }

    /// Append a tag; tags are reported in insertion order (newest first)
    pub fn add_tag(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.tags.push(TagRef::new(name, commit));
    }

    pub fn set_root_commit(&mut self, commit: impl Into<String>) {
        self.root_commit = Some(commit.into());
    }

    pub fn set_head(&mut self, commit: impl Into<String>) {
        self.head = commit.into();
    }

    /// Register the summaries returned for `since..HEAD` under `scope`
    pub fn add_history(
        &mut self,
        since: impl Into<String>,
        scope: impl Into<PathBuf>,
        summaries: &[&str],
    ) {
        self.histories.insert(
            (since.into(), scope.into()),
            summaries.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Make creation of the named tag fail
    pub fn fail_tag(&mut self, name: impl Into<String>) {
        self.failing_tag = Some(name.into());
    }

    /// Make every push fail with the given captured streams
    pub fn fail_push(&mut self, stdout: impl Into<String>, stderr: impl Into<String>) {
        self.push_failure = Some((stdout.into(), stderr.into()));
    }

    pub fn created_tags(&self) -> Vec<String> {
        self.created_tags.borrow().clone()
    }

    pub fn pushes(&self) -> Vec<PushCall> {
        self.pushes.borrow().clone()
    }

    /// Number of times the tag list was requested
    pub fn tag_listings(&self) -> usize {
        self.tag_listings.get()
    }
}

impl Repository for MockRepository {
    fn is_inside_repository(&self) -> bool {
        self.inside
    }

    fn root_path(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn list_tags(&self) -> Result<Vec<TagRef>> {
        self.tag_listings.set(self.tag_listings.get() + 1);
        Ok(self.tags.clone())
    }

    fn first_root_commit(&self) -> Result<String> {
        self.root_commit
            .clone()
            .ok_or_else(|| SemverTagsError::root_commit("mock has no root commit"))
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head.clone())
    }

    fn commit_summaries(
        &self,
        since: &str,
        _until: &str,
        path_scope: &Path,
    ) -> Result<Vec<String>> {
        Ok(self
            .histories
            .get(&(since.to_string(), path_scope.to_path_buf()))
            .cloned()
            .unwrap_or_default())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.failing_tag.as_deref() == Some(name) {
            return Err(SemverTagsError::tag_creation(name, "tag already exists"));
        }
        self.created_tags.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn push_tags(
        &self,
        remote: &str,
        branch: &str,
        tag_names: &[&str],
        atomic: bool,
    ) -> Result<()> {
        self.pushes.borrow_mut().push(PushCall {
            remote: remote.to_string(),
            branch: branch.to_string(),
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
            atomic,
        });

        if let Some((stdout, stderr)) = &self.push_failure {
            return Err(SemverTagsError::push(
                "exit status: 1",
                stdout.clone(),
                stderr.clone(),
            ));
        }
        Ok(())
    }
}
