use std::sync::LazyLock;

use anyhow::Result;
use log::{debug, warn};
use regex::Regex;

use crate::config::PRODUCT_PACKAGE_PREFIX;
use crate::domain::{InstalledState, Version};
use crate::package_manager::PackageManager;

/// Main package of a release line, e.g. `libreoffice7.4`. Component packages
/// such as `libreoffice7.4-calc` share the prefix but not the whole name.
static FAMILY_PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{}\d+\.\d+$", regex::escape(PRODUCT_PACKAGE_PREFIX)))
        .expect("family package pattern is valid")
});

/// Reads installed product versions from the package database.
pub struct InstalledVersionProbe<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> InstalledVersionProbe<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    #[tracing::instrument(skip(self))]
    pub fn probe(&self) -> Result<InstalledState> {
        let pattern = format!("{}*", PRODUCT_PACKAGE_PREFIX);
        let packages = self.package_manager.query_installed(&pattern)?;

        let mut versions = Vec::new();
        for package in packages {
            if !FAMILY_PACKAGE_RE.is_match(&package.name) {
                continue;
            }
            match Version::parse(&package.version) {
                Ok(version) => {
                    debug!("Found {} {}", package.name, version);
                    versions.push(version);
                }
                Err(e) => warn!("Skipping package {}: {}", package.name, e),
            }
        }

        Ok(InstalledState::new(versions))
    }
}
