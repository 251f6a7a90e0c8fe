//! Product version value type.
//!
//! Labels come in two shapes: `N.N.N[suffix]` from the stable listing page
//! and `N.N[.N][suffix]` from the local package database. Both parse into the
//! same totally ordered [`Version`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::VersionError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?([^\s/]*)$").expect("version pattern is valid")
});

/// An immutable product version.
///
/// Ordering compares `(major, minor, patch)` numerically and falls back to a
/// lexical comparison of the suffix. A missing suffix sorts before any suffix.
/// The display string does not take part in comparisons.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    suffix: Option<String>,
    display: String,
}

impl Version {
    /// Parse a label such as `7.5.0`, `7.4` or `7.4.5.1-1`.
    pub fn parse(label: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersionFormat(label.to_string());
        let caps = VERSION_RE.captures(label).ok_or_else(invalid)?;

        let number = |i: usize| -> Result<u64, VersionError> {
            match caps.get(i) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        let suffix = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            suffix,
            display: label.to_string(),
        })
    }

    /// The sentinel used when nothing is installed or the remote check was skipped.
    pub fn zero() -> Self {
        Self {
            major: 0,
            minor: 0,
            patch: 0,
            suffix: None,
            display: "0.0.0".to_string(),
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// The label this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// The `major.minor` package family, e.g. `7.4`.
    pub fn family(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    fn key(&self) -> (u64, u64, u64, &str) {
        (
            self.major,
            self.minor,
            self.patch,
            self.suffix.as_deref().unwrap_or(""),
        )
    }
}

/// Greatest version of a collection.
///
/// Callers that may legitimately have nothing to compare must supply
/// [`Version::zero`] themselves.
pub fn max_version<'a, I>(versions: I) -> Result<&'a Version, VersionError>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions.into_iter().max().ok_or(VersionError::EmptySet)
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}
