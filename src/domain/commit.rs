use std::fmt;

/// Release impact of a single commit, ordered from none to major
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CommitSeverity {
    #[default]
    NoRelease,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for CommitSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommitSeverity::NoRelease => "none",
            CommitSeverity::Patch => "patch",
            CommitSeverity::Minor => "minor",
            CommitSeverity::Major => "major",
        };
        f.write_str(label)
    }
}

/// Commit type labels and the severity each one carries.
/// Labels not listed here do not trigger a release.
const TYPE_SEVERITIES: &[(&str, CommitSeverity)] = &[
    ("fix", CommitSeverity::Patch),
    ("chore", CommitSeverity::Patch),
    ("docs", CommitSeverity::Patch),
    ("style", CommitSeverity::Patch),
    ("refactor", CommitSeverity::Patch),
    ("test", CommitSeverity::Patch),
    ("revert", CommitSeverity::Patch),
    ("feat", CommitSeverity::Minor),
    ("BREAKING CHANGE", CommitSeverity::Major),
];

/// Classify a commit summary line
///
/// Only the subject line is considered. Supported shapes:
/// - `type: description`
/// - `type(scope): description`
/// - `type!: description` / `type(scope)!: description` (breaking)
/// - `BREAKING CHANGE: description`
///
/// Anything without a `:` or with an unknown type is `NoRelease`.
pub fn classify(summary: &str) -> CommitSeverity {
    let Some((type_and_scope, _)) = summary.split_once(':') else {
        return CommitSeverity::NoRelease;
    };

    let commit_type = type_and_scope
        .split_once('(')
        .map_or(type_and_scope, |(commit_type, _)| commit_type);

    if type_and_scope.ends_with('!') || commit_type.ends_with('!') {
        return CommitSeverity::Major;
    }

    TYPE_SEVERITIES
        .iter()
        .find(|(label, _)| *label == commit_type)
        .map_or(CommitSeverity::NoRelease, |(_, severity)| *severity)
}

/// Highest severity across a set of summary lines
pub fn max_severity<I, S>(summaries: I) -> CommitSeverity
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    summaries
        .into_iter()
        .map(|summary| classify(summary.as_ref()))
        .max()
        .unwrap_or_default()
}
