use std::collections::BTreeSet;

use super::version::{Version, max_version};

/// Versions currently installed on this machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledState {
    versions: BTreeSet<Version>,
}

impl InstalledState {
    pub fn new(versions: impl IntoIterator<Item = Version>) -> Self {
        Self {
            versions: versions.into_iter().collect(),
        }
    }

    /// Installed versions in ascending order.
    pub fn versions(&self) -> Vec<&Version> {
        self.versions.iter().collect()
    }

    pub fn is_installed(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn has_multiple(&self) -> bool {
        self.versions.len() > 1
    }

    /// The newest installed version, or [`Version::zero`] when nothing is installed.
    pub fn greatest(&self) -> Version {
        max_version(&self.versions)
            .cloned()
            .unwrap_or_else(|_| Version::zero())
    }
}

/// Versions published on the stable listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteState {
    published: Vec<Version>,
    latest: Version,
    checked: bool,
}

impl RemoteState {
    /// Build from the versions found on the listing, sorted ascending.
    pub fn checked(mut published: Vec<Version>) -> Self {
        published.sort();
        published.dedup();
        let latest = max_version(&published)
            .cloned()
            .unwrap_or_else(|_| Version::zero());
        Self {
            published,
            latest,
            checked: true,
        }
    }

    /// State for a run that did not query the listing.
    pub fn skipped() -> Self {
        Self {
            published: Vec::new(),
            latest: Version::zero(),
            checked: false,
        }
    }

    pub fn published(&self) -> &[Version] {
        &self.published
    }

    pub fn latest(&self) -> &Version {
        &self.latest
    }

    /// Whether the listing was actually queried.
    pub fn was_checked(&self) -> bool {
        self.checked
    }
}
