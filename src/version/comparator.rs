//! Version granularity comparison
//!
//! Versions are compared on their leading `major.minor.micro` tokens as
//! plain strings, so `"01"` and `"1"` count as different. Versions that do
//! not start with three dotted numbers cannot be classified; a change
//! between them is always reported rather than hidden.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").unwrap());

/// Granularity at which a version change must happen to be reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VersionFilter {
    /// Only new major releases
    Major,
    /// New minor and major releases
    Minor,
    /// New micro, minor and major releases
    Micro,
    /// Every version change
    #[default]
    All,
}

impl VersionFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionFilter::Major => "major",
            VersionFilter::Minor => "minor",
            VersionFilter::Micro => "micro",
            VersionFilter::All => "all",
        }
    }

    /// Decide whether moving from `old` to `new` is reportable under this filter
    pub fn reports(&self, old: &str, new: &str) -> bool {
        if old == new {
            return false;
        }
        if *self == VersionFilter::All {
            return true;
        }

        let classification = classify(old, new);
        if !classification.parseable {
            return true;
        }

        match self {
            VersionFilter::Major => classification.relation == Relation::DifferentAtMajor,
            VersionFilter::Minor => matches!(
                classification.relation,
                Relation::DifferentAtMajor | Relation::DifferentAtMinor
            ),
            VersionFilter::Micro | VersionFilter::All => {
                classification.relation != Relation::IdenticalOrUnparseable
            }
        }
    }
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most significant component at which two versions differ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    DifferentAtMajor,
    DifferentAtMinor,
    DifferentAtMicro,
    IdenticalOrUnparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub relation: Relation,
    /// Whether both versions matched the `major.minor.micro` pattern
    pub parseable: bool,
}

/// Leading numeric tokens of a version, kept as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTokens<'a> {
    pub major: &'a str,
    pub minor: &'a str,
    pub micro: &'a str,
}

/// Split off the `major.minor.micro` prefix of a version.
///
/// Examples:
/// - "3.10.4" -> ("3", "10", "4")
/// - "6.1.1.arch1-1" -> ("6", "1", "1")
/// - "2022-abcde" -> None
pub fn parse_tokens(version: &str) -> Option<VersionTokens<'_>> {
    let captures = VERSION_PATTERN.captures(version)?;
    Some(VersionTokens {
        major: captures.get(1)?.as_str(),
        minor: captures.get(2)?.as_str(),
        micro: captures.get(3)?.as_str(),
    })
}

/// Classify the difference between two versions
pub fn classify(old: &str, new: &str) -> Classification {
    let (Some(old), Some(new)) = (parse_tokens(old), parse_tokens(new)) else {
        return Classification {
            relation: Relation::IdenticalOrUnparseable,
            parseable: false,
        };
    };

    let relation = if old.major != new.major {
        Relation::DifferentAtMajor
    } else if old.minor != new.minor {
        Relation::DifferentAtMinor
    } else if old.micro != new.micro {
        Relation::DifferentAtMicro
    } else {
        Relation::IdenticalOrUnparseable
    };

    Classification {
        relation,
        parseable: true,
    }
}
