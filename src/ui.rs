//! Human-readable run summary on stderr
//!
//! Stdout is reserved for machine outputs, so everything here goes to stderr.

use crate::cli::WorkflowResult;
use crate::domain::ReleaseRecord;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// One line per target: `name: v0.1.0 -> v0.2.0 (minor)` or `name: v1.0.0 (unchanged)`
pub fn format_record(record: &ReleaseRecord) -> String {
    if record.is_changed() {
        format!(
            "{}: {} -> {} ({})",
            record.target.display_name(),
            record.last.version,
            record.next_version,
            record.severity
        )
    } else {
        format!(
            "{}: {} (unchanged)",
            record.target.display_name(),
            record.last.version
        )
    }
}

/// Print every target and what happened to its tag.
pub fn display_release_summary(result: &WorkflowResult, dry_run: bool) {
    let heading = if dry_run {
        "Release summary (dry run)"
    } else {
        "Release summary"
    };
    eprintln!("\n{}", style(heading).bold());

    for record in &result.records {
        let line = format_record(record);
        if record.is_changed() {
            eprintln!("  {} {}", style("✓").green(), line);
        } else {
            eprintln!("  {} {}", style("·").dim(), style(line).dim());
        }
    }

    if result.pushed {
        eprintln!(
            "{} pushed {} tag(s)",
            style("→").yellow(),
            result.plan.len()
        );
    } else if dry_run && !result.plan.is_empty() {
        eprintln!(
            "{} would create {}",
            style("→").yellow(),
            result.plan.names().join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitSeverity, TargetDescriptor, Version, VersionInfo};
    use std::path::{Path, PathBuf};

    fn record(next: Version, severity: CommitSeverity) -> ReleaseRecord {
        ReleaseRecord {
            target: TargetDescriptor {
                package_name: "api".to_string(),
                directory: "api".to_string(),
                repo_relative_path: PathBuf::from("api"),
                absolute_path: Path::new("/repo/api").to_path_buf(),
                is_root: false,
            },
            last: VersionInfo {
                package: "api".to_string(),
                version: Version::new(1, 0, 0),
                commit: "c1".to_string(),
            },
            next_version: next,
            severity,
            release_notes: Vec::new(),
        }
    }

    #[test]
    fn test_format_changed_record() {
        let line = format_record(&record(Version::new(1, 1, 0), CommitSeverity::Minor));
        assert_eq!(line, "api: v1.0.0 -> v1.1.0 (minor)");
    }

    #[test]
    fn test_format_unchanged_record() {
        let line = format_record(&record(Version::new(1, 0, 0), CommitSeverity::NoRelease));
        assert_eq!(line, "api: v1.0.0 (unchanged)");
    }
}
