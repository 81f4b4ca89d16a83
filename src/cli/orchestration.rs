//! Main tagging workflow
//!
//! Drives one run from start to finish:
//!
//! 1. Check the working directory is inside a repository
//! 2. Resolve the requested directories into targets
//! 3. Compute the last and next version of every target, sequentially
//! 4. Plan tags for the targets whose version changed and build the outputs
//! 5. Create and push the planned tags, unless this is a dry run
//! 6. Emit the outputs
//!
//! Any failure ends the run. Nothing is pushed unless every planned tag was
//! created locally, and no outputs are emitted for a failed run.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::analyzer::{find_last_version, HistoryAnalyzer, TagCache};
use crate::domain::{ReleaseRecord, TagPlan};
use crate::error::{Result, SemverTagsError};
use crate::git::Repository;
use crate::output::{generate_outputs, OutputSink, Outputs};
use crate::resolver::resolve_targets;

/// Resolved run parameters
///
/// Mirrors the CLI flags after config and environment merging, so the
/// workflow can be driven without clap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingWorkflowArgs {
    /// Compute and report without creating or pushing tags
    pub dry_run: bool,
    /// Emit GitHub Actions step outputs
    pub github_action: bool,
    /// Emit a single-line JSON object
    pub output_json: bool,
    /// Push with `--atomic`
    pub atomic: bool,
    /// Requested pre-release track, empty for a normal release
    pub pre_release: String,
    /// Requested build metadata
    pub build: String,
    pub remote: String,
    pub branch: String,
    /// Package directories; empty versions the whole repository
    pub directories: Vec<String>,
    /// Directory that relative package directories are resolved against
    pub working_dir: PathBuf,
}

impl Default for TaggingWorkflowArgs {
    fn default() -> Self {
        TaggingWorkflowArgs {
            dry_run: false,
            github_action: false,
            output_json: true,
            atomic: true,
            pre_release: String::new(),
            build: String::new(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            directories: Vec::new(),
            working_dir: PathBuf::from("."),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    /// One record per target, in resolution order
    pub records: Vec<ReleaseRecord>,
    /// Tags for the targets whose version changed
    pub plan: TagPlan,
    pub outputs: Outputs,
    /// Whether the planned tags were pushed
    pub pushed: bool,
}

/// Run the tagging workflow against `repo`
///
/// # Arguments
///
/// * `repo` - Version-control collaborator
/// * `args` - Resolved run parameters
/// * `sinks` - Output destinations, each receiving the same fields
///
/// # Returns
///
/// The computed records, the tag plan and the emitted outputs
#[instrument(skip_all, fields(dry_run = args.dry_run))]
pub fn run_tagging_workflow<R: Repository + ?Sized>(
    repo: &R,
    args: &TaggingWorkflowArgs,
    sinks: &mut [Box<dyn OutputSink>],
) -> Result<WorkflowResult> {
    if !repo.is_inside_repository() {
        return Err(SemverTagsError::NotARepository(args.working_dir.clone()));
    }

    let root = repo.root_path()?;
    let targets = resolve_targets(&root, &args.working_dir, &args.directories);
    info!(count = targets.len(), "resolved release targets");

    let analyzer = HistoryAnalyzer::new(args.pre_release.as_str(), args.build.as_str());
    let mut cache = TagCache::new();
    let records = targets
        .iter()
        .map(|target| {
            let last = find_last_version(repo, &mut cache, target)?;
            analyzer.analyze(repo, target, last)
        })
        .collect::<Result<Vec<_>>>()?;

    for record in records.iter().filter(|r| !r.is_changed()) {
        info!(
            package = %record.target.display_name(),
            version = %record.last.version,
            "no new version"
        );
    }

    let plan = TagPlan::from_records(&records);
    let head = repo.head_commit()?;
    let outputs = generate_outputs(&records, &head, args.dry_run)?;

    let pushed = if args.dry_run {
        for tag in plan.iter() {
            info!(tag = %tag.name, "dry run: would create tag");
        }
        false
    } else {
        publish(repo, &plan, args)?
    };

    for sink in sinks.iter_mut() {
        sink.emit(&outputs)?;
    }

    Ok(WorkflowResult {
        records,
        plan,
        outputs,
        pushed,
    })
}

/// Create every planned tag, then push them together
///
/// Stops at the first tag that cannot be created; tags already created stay
/// local. Returns whether a push happened.
fn publish<R: Repository + ?Sized>(
    repo: &R,
    plan: &TagPlan,
    args: &TaggingWorkflowArgs,
) -> Result<bool> {
    if plan.is_empty() {
        info!("nothing to tag");
        return Ok(false);
    }

    for tag in plan.iter() {
        repo.create_tag(&tag.name)?;
    }

    let names = plan.names();
    repo.push_tags(&args.remote, &args.branch, &names, args.atomic)?;
    info!(
        remote = %args.remote,
        branch = %args.branch,
        count = names.len(),
        "pushed tags"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{MockRepository, PushCall};

    fn args(dry_run: bool) -> TaggingWorkflowArgs {
        TaggingWorkflowArgs {
            dry_run,
            working_dir: PathBuf::from("/repo"),
            ..TaggingWorkflowArgs::default()
        }
    }

    fn released_repo() -> MockRepository {
        let mut repo = MockRepository::new("/repo");
        repo.add_tag("v0.1.0", "c1");
        repo.add_history("c1", "./", &["feat: b", "fix: a"]);
        repo.set_head("c3");
        repo
    }

    #[test]
    fn test_outside_repository_fails() {
        let mut repo = MockRepository::new("/repo");
        repo.set_outside_repository();

        let result = run_tagging_workflow(&repo, &args(false), &mut []);
        assert!(matches!(result, Err(SemverTagsError::NotARepository(_))));
    }

    #[test]
    fn test_real_run_creates_then_pushes() {
        let repo = released_repo();
        let result = run_tagging_workflow(&repo, &args(false), &mut []).unwrap();

        assert!(result.pushed);
        assert_eq!(repo.created_tags(), vec!["v0.2.0"]);
        assert_eq!(
            repo.pushes(),
            vec![PushCall {
                remote: "origin".to_string(),
                branch: "main".to_string(),
                tags: vec!["v0.2.0".to_string()],
                atomic: true,
            }]
        );
        assert_eq!(result.outputs.new_release_git_head, "c3");
    }

    #[test]
    fn test_dry_run_never_mutates() {
        let repo = released_repo();
        let result = run_tagging_workflow(&repo, &args(true), &mut []).unwrap();

        assert!(!result.pushed);
        assert!(repo.created_tags().is_empty());
        assert!(repo.pushes().is_empty());
        assert_eq!(result.plan.names(), vec!["v0.2.0"]);
        assert_eq!(result.outputs.dry_run, "true");
    }

    #[test]
    fn test_unchanged_run_skips_push() {
        let mut repo = MockRepository::new("/repo");
        repo.add_tag("v1.0.0", "c1");

        let result = run_tagging_workflow(&repo, &args(false), &mut []).unwrap();

        assert!(result.plan.is_empty());
        assert!(!result.pushed);
        assert!(repo.pushes().is_empty());
        assert_eq!(result.outputs.new_release_published, "false");
    }
}
