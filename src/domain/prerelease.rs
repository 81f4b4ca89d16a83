//! Pre-release track handling
//!
//! A pre-release token such as `rc.2` is read as a track name (`rc`) plus an
//! optional iteration in the second `.`-separated segment. Segments past the
//! second are not part of the track and are dropped on increment.

use std::fmt;

/// Second segment of a pre-release token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// No second segment: the track started implicitly at 1
    Implicit,
    /// Numeric counter
    Number(u64),
    /// Second segment present but not a number
    Label(String),
}

/// Pre-release version split into track and iteration
///
/// # Examples
/// - "rc" -> PreRelease { track: "rc", iteration: Implicit }
/// - "beta.1" -> PreRelease { track: "beta", iteration: Number(1) }
/// - "dev.next" -> PreRelease { track: "dev", iteration: Label("next") }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub track: String,
    pub iteration: Iteration,
}

impl PreRelease {
    /// Parse a pre-release token. Total: an empty token yields an empty track.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('.');
        let track = parts.next().unwrap_or_default().to_string();

        let iteration = match parts.next() {
            None => Iteration::Implicit,
            Some(segment) => match segment.parse::<u64>() {
                Ok(n) => Iteration::Number(n),
                Err(_) => Iteration::Label(segment.to_string()),
            },
        };

        PreRelease { track, iteration }
    }

    /// First iteration of a freshly requested track
    pub fn start(track: &str) -> Self {
        PreRelease {
            track: track.to_string(),
            iteration: Iteration::Number(1),
        }
    }

    /// Next iteration on the same track
    ///
    /// An implicit iteration counts as 1, so the next one is 2. A label that
    /// is not a number restarts the counter at 1.
    pub fn increment_iteration(&self) -> Self {
        let iteration = match &self.iteration {
            Iteration::Implicit => Iteration::Number(2),
            Iteration::Number(n) => Iteration::Number(n.saturating_add(1)),
            Iteration::Label(_) => Iteration::Number(1),
        };

        PreRelease {
            track: self.track.clone(),
            iteration,
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.track)?;
        match &self.iteration {
            Iteration::Implicit => Ok(()),
            Iteration::Number(n) => write!(f, ".{}", n),
            Iteration::Label(label) => write!(f, ".{}", label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_parse_with_iteration() {
        let pr = PreRelease::parse("beta.1");
        assert_eq!(pr.track, "beta");
        assert_eq!(pr.iteration, Iteration::Number(1));
    }

    #[test]
    fn test_prerelease_parse_no_iteration() {
        let pr = PreRelease::parse("alpha");
        assert_eq!(pr.track, "alpha");
        assert_eq!(pr.iteration, Iteration::Implicit);
    }

    #[test]
    fn test_prerelease_parse_label_iteration() {
        let pr = PreRelease::parse("dev.next");
        assert_eq!(pr.iteration, Iteration::Label("next".to_string()));
    }

    #[test]
    fn test_prerelease_parse_empty() {
        let pr = PreRelease::parse("");
        assert!(pr.track.is_empty());
        assert_eq!(pr.iteration, Iteration::Implicit);
    }

    #[test]
    fn test_prerelease_increment_with_iteration() {
        let pr = PreRelease::parse("rc.99");
        assert_eq!(pr.increment_iteration().to_string(), "rc.100");
    }

    #[test]
    fn test_prerelease_increment_from_implicit() {
        let pr = PreRelease::parse("rc");
        assert_eq!(pr.increment_iteration().to_string(), "rc.2");
    }

    #[test]
    fn test_prerelease_increment_from_label() {
        let pr = PreRelease::parse("rc.final");
        assert_eq!(pr.increment_iteration().to_string(), "rc.1");
    }

    #[test]
    fn test_prerelease_increment_drops_extra_segments() {
        let pr = PreRelease::parse("rc.3.hotfix");
        assert_eq!(pr.increment_iteration().to_string(), "rc.4");
    }

    #[test]
    fn test_prerelease_start() {
        assert_eq!(PreRelease::start("staging").to_string(), "staging.1");
    }
}
