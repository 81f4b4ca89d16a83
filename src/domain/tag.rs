use crate::domain::release::ReleaseRecord;
use crate::domain::version::Version;
use crate::error::{Result, SemverTagsError};

/// Tag name for a package version: `<package>/<version>`, or just the
/// version for the whole-repository package.
pub fn tag_name(package: &str, version: &Version) -> String {
    format!("{}/{}", package, version)
        .trim_start_matches('/')
        .to_string()
}

/// An existing release tag decoded into package, version and commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Everything before the last `/` of the tag name
    pub package: String,
    pub version: Version,
    pub commit: String,
}

impl TagEntry {
    /// Decode a tag name such as `libs/api/v1.2.0` pointing at `commit`
    pub fn parse(ref_name: &str, commit: &str) -> Result<Self> {
        let package = ref_name
            .rsplit_once('/')
            .map_or("", |(package, _)| package)
            .to_string();

        let version = Version::parse(ref_name).map_err(|e| {
            SemverTagsError::tag_parse(format!("{},{}", ref_name, commit), e.to_string())
        })?;

        Ok(TagEntry {
            package,
            version,
            commit: commit.to_string(),
        })
    }
}

/// A tag that the run will create and push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTag {
    pub package: String,
    pub version: Version,
    pub name: String,
}

/// Tags to create, in target resolution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    tags: Vec<PlannedTag>,
}

impl TagPlan {
    /// Select every record whose version changed
    pub fn from_records(records: &[ReleaseRecord]) -> Self {
        let tags = records
            .iter()
            .filter(|record| record.is_changed())
            .map(|record| PlannedTag {
                package: record.package().to_string(),
                version: record.next_version.clone(),
                name: record.next_tag(),
            })
            .collect();

        TagPlan { tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedTag> {
        self.tags.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}
