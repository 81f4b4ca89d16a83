//! Flat, comma-joined release metadata for CI pipelines and JSON consumers

pub mod sink;

pub use sink::{GithubActionSink, JsonSink, OutputSink};

use crate::domain::ReleaseRecord;
use crate::error::Result;
use serde::Serialize;

/// Export fields, one comma-joined entry per target in resolution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outputs {
    pub new_release_published: String,
    pub new_release_version: String,
    pub new_release_major_version: String,
    pub new_release_minor_version: String,
    pub new_release_patch_version: String,
    pub new_release_git_head: String,
    pub new_release_notes: String,
    pub new_release_notes_json: String,
    pub dry_run: String,
    pub release_package: String,
    pub new_release_git_tag: String,
    pub last_release_version: String,
    pub last_release_git_head: String,
    pub last_release_git_tag: String,
}

impl Outputs {
    /// Field names paired with their values, in export order
    pub fn fields(&self) -> [(&'static str, &str); 14] {
        [
            ("new_release_published", &self.new_release_published),
            ("new_release_version", &self.new_release_version),
            ("new_release_major_version", &self.new_release_major_version),
            ("new_release_minor_version", &self.new_release_minor_version),
            ("new_release_patch_version", &self.new_release_patch_version),
            ("new_release_git_head", &self.new_release_git_head),
            ("new_release_notes", &self.new_release_notes),
            ("new_release_notes_json", &self.new_release_notes_json),
            ("dry_run", &self.dry_run),
            ("release_package", &self.release_package),
            ("new_release_git_tag", &self.new_release_git_tag),
            ("last_release_version", &self.last_release_version),
            ("last_release_git_head", &self.last_release_git_head),
            ("last_release_git_tag", &self.last_release_git_tag),
        ]
    }
}

/// Fold release records into export fields
///
/// Every record appears, changed or not; `new_release_published` tells them
/// apart. `head` is the commit the new tags point at.
pub fn generate_outputs(records: &[ReleaseRecord], head: &str, dry_run: bool) -> Result<Outputs> {
    let join = |field: fn(&ReleaseRecord) -> String| joined(records, field, ",");

    Ok(Outputs {
        new_release_published: join(|r| r.is_changed().to_string()),
        new_release_version: join(|r| r.next_version.core()),
        new_release_major_version: join(|r| r.next_version.major.to_string()),
        new_release_minor_version: join(|r| r.next_version.minor.to_string()),
        new_release_patch_version: join(|r| r.next_version.patch.to_string()),
        new_release_git_head: vec![head; records.len()].join(","),
        new_release_notes: joined(records, |r| r.release_notes.join("\n"), ",\n"),
        new_release_notes_json: notes_json(records)?,
        dry_run: vec![dry_run.to_string(); records.len()].join(","),
        release_package: join(|r| r.package().to_string()),
        new_release_git_tag: join(|r| r.next_tag()),
        last_release_version: join(|r| r.last.version.core()),
        last_release_git_head: join(|r| r.last.commit.clone()),
        last_release_git_tag: join(|r| r.last_tag()),
    })
}

fn joined<F>(records: &[ReleaseRecord], field: F, separator: &str) -> String
where
    F: Fn(&ReleaseRecord) -> String,
{
    records.iter().map(field).collect::<Vec<_>>().join(separator)
}

/// `{"new_release_notes_escaped":{"package_<name>":[...],...}}` on one line
///
/// Keys follow target order, which a map-based serializer would not keep.
fn notes_json(records: &[ReleaseRecord]) -> Result<String> {
    let packages = records
        .iter()
        .map(|r| -> Result<String> {
            let key = serde_json::to_string(&format!("package_{}", r.package()))?;
            let notes = serde_json::to_string(&r.release_notes)?;
            Ok(format!("{}:{}", key, notes))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "{{\"new_release_notes_escaped\":{{{}}}}}",
        packages.join(",")
    ))
}
