use crate::domain::commit::CommitSeverity;
use crate::domain::prerelease::PreRelease;
use crate::error::{Result, SemverTagsError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Semantic version with opaque pre-release and build tokens
///
/// The canonical text form is `v<major>.<minor>.<patch>[-<pre>][+<build>]`.
/// Whether two versions differ is decided on that text form, so `Display`
/// must stay deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: String,
    pub build: String,
}

impl Version {
    /// Create a new release version with no pre-release or build metadata
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build: String::new(),
        }
    }

    /// Baseline used when a package has never been tagged
    pub fn initial() -> Self {
        Version::new(0, 1, 0)
    }

    /// Builder-style setter for the pre-release token
    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = pre_release.into();
        self
    }

    /// Builder-style setter for the build token
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = build.into();
        self
    }

    /// Parse a version from a tag reference
    ///
    /// Accepts a bare version (`1.2.3`, `v1.2.3-rc.1+abc`), a tag name whose
    /// last `/` segment is the version (`pkg/v1.2.3`), or a combined tag line
    /// (`pkg/v1.2.3,<hash>`). The numeric part must be exactly three
    /// unsigned integers.
    pub fn parse(reference: &str) -> Result<Self> {
        let name = reference.split(',').next().unwrap_or(reference);
        let segment = name.rsplit('/').next().unwrap_or(name);
        let version_part = segment.strip_prefix('v').unwrap_or(segment);

        let (numbers, pre_release, build) = split_version(version_part);

        let captures = Regex::new(r"^(\d+)\.(\d+)\.(\d+)$")
            .ok()
            .and_then(|re| re.captures(numbers))
            .ok_or_else(|| {
                SemverTagsError::version(format!(
                    "Invalid version format: '{}' - expected X.Y.Z",
                    reference
                ))
            })?;

        let component = |index: usize, label: &str| -> Result<u32> {
            let text = captures.get(index).map(|m| m.as_str()).unwrap_or_default();
            text.parse::<u32>().map_err(|_| {
                SemverTagsError::version(format!("Invalid {} version: {}", label, text))
            })
        };

        Ok(Version {
            major: component(1, "major")?,
            minor: component(2, "minor")?,
            patch: component(3, "patch")?,
            pre_release: pre_release.to_string(),
            build: build.to_string(),
        })
    }

    /// `major.minor.patch` without prefix or metadata
    pub fn core(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Canonical display form, used for change detection and tag names
    pub fn formatted(&self) -> String {
        self.to_string()
    }

    /// True when both versions render to the same canonical string
    pub fn same_release_as(&self, other: &Version) -> bool {
        self.formatted() == other.formatted()
    }

    /// Compute the next version for a commit set of the given severity
    ///
    /// Rules, in order:
    /// 1. `NoRelease` leaves the version untouched.
    /// 2. A requested pre-release naming the current track bumps the track
    ///    counter (`rc.1` -> `rc.2`), keeping the numeric triple.
    /// 3. Any other non-empty request starts a new track at `.1`, keeping the
    ///    numeric triple and applying the requested build.
    /// 4. Otherwise the numeric triple is bumped, pre-release and build are
    ///    cleared and the requested build (if any) applied.
    pub fn bump(
        &self,
        severity: CommitSeverity,
        requested_pre_release: &str,
        requested_build: &str,
    ) -> Version {
        if severity == CommitSeverity::NoRelease {
            return self.clone();
        }

        let clean_requested = requested_pre_release.trim();
        let current = PreRelease::parse(&self.pre_release);
        let mut next = self.clone();

        if !current.track.is_empty() && clean_requested == current.track {
            next.pre_release = current.increment_iteration().to_string();
            return next;
        }

        if !clean_requested.is_empty() {
            next.pre_release = PreRelease::start(clean_requested).to_string();
            if !requested_build.is_empty() {
                next.build = requested_build.to_string();
            }
            return next;
        }

        match severity {
            CommitSeverity::Major => {
                next.major = next.major.saturating_add(1);
                next.minor = 0;
                next.patch = 0;
            }
            CommitSeverity::Minor => {
                next.minor = next.minor.saturating_add(1);
                next.patch = 0;
            }
            CommitSeverity::Patch => {
                next.patch = next.patch.saturating_add(1);
            }
            CommitSeverity::NoRelease => return next,
        }

        next.pre_release.clear();
        next.build = requested_build.to_string();
        next
    }
}

/// Split `1.2.3-pre+build` into its three parts.
///
/// The pre-release starts at the first `-` and the build at the first `+`
/// after it. A `+` ahead of any `-` means there is no pre-release at all.
fn split_version(text: &str) -> (&str, &str, &str) {
    let dash = text.find('-');
    let plus = text.find('+');

    match (dash, plus) {
        (Some(d), Some(p)) if p < d => (&text[..p], "", &text[p + 1..]),
        (None, Some(p)) => (&text[..p], "", &text[p + 1..]),
        (Some(d), _) => {
            let rest = &text[d + 1..];
            match rest.split_once('+') {
                Some((pre, build)) => (&text[..d], pre, build),
                None => (&text[..d], rest, ""),
            }
        }
        (None, None) => (text, "", ""),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = SemverTagsError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}
