use crate::domain::{TagEntry, TargetDescriptor, Version, VersionInfo};
use crate::error::Result;
use crate::git::Repository;
use tracing::{debug, instrument};

/// Decoded release tags, read once per run
///
/// Entries keep the collaborator's order (tagged commit time, newest first).
/// The cache never refreshes, so every target in a run sees the same tag
/// snapshot.
#[derive(Debug, Default)]
pub struct TagCache {
    entries: Option<Vec<TagEntry>>,
}

impl TagCache {
    pub fn new() -> Self {
        TagCache::default()
    }

    /// Cached entries, listing and decoding the repository's tags on first use
    ///
    /// Any tag that does not decode to a version fails the whole read.
    pub fn entries<R: Repository + ?Sized>(&mut self, repo: &R) -> Result<&[TagEntry]> {
        if self.entries.is_none() {
            let entries = repo
                .list_tags()?
                .iter()
                .map(|tag| TagEntry::parse(&tag.ref_name, &tag.object_hash))
                .collect::<Result<Vec<_>>>()?;

            debug!(count = entries.len(), "tag cache populated");
            self.entries = Some(entries);
        }

        Ok(self.entries.as_deref().unwrap_or_default())
    }

    pub fn is_populated(&self) -> bool {
        self.entries.is_some()
    }
}

/// Most recently tagged release for a target
///
/// The first cached entry whose package equals the target's package name or
/// its raw directory wins, so the baseline is the newest matching tag and
/// not the highest version. Without a match the baseline is `v0.1.0` at the
/// repository's first root commit.
#[instrument(skip_all, fields(package = %target.display_name()))]
pub fn find_last_version<R: Repository + ?Sized>(
    repo: &R,
    cache: &mut TagCache,
    target: &TargetDescriptor,
) -> Result<VersionInfo> {
    let found = cache
        .entries(repo)?
        .iter()
        .find(|entry| entry.package == target.package_name || entry.package == target.directory)
        .cloned();

    if let Some(entry) = found {
        debug!(version = %entry.version, commit = %entry.commit, "last release found");
        return Ok(VersionInfo {
            package: target.package_name.clone(),
            version: entry.version,
            commit: entry.commit,
        });
    }

    let root = repo.first_root_commit()?;
    debug!(commit = %root, "no release tag; starting from root commit");
    Ok(VersionInfo {
        package: target.package_name.clone(),
        version: Version::initial(),
        commit: root,
    })
}
