use anyhow::Result;
use log::info;

use crate::config::{BASE_PACKAGE_PREFIX, PRODUCT_PACKAGE_PREFIX};
use crate::domain::Version;
use crate::package_manager::PackageManager;

/// Removes an installed release line through the package manager.
pub struct RemovalController<'a> {
    package_manager: &'a dyn PackageManager,
}

impl<'a> RemovalController<'a> {
    pub fn new(package_manager: &'a dyn PackageManager) -> Self {
        Self { package_manager }
    }

    /// Name patterns covering every package of the `major.minor` family.
    pub fn family_patterns(version: &Version) -> Vec<String> {
        let family = version.family();
        vec![
            format!("{}{}*", PRODUCT_PACKAGE_PREFIX, family),
            format!("{}{}*", BASE_PACKAGE_PREFIX, family),
        ]
    }

    /// Remove the release line `version` belongs to. A failing tool ends the
    /// run; dry runs are simulated by the package manager itself.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, version: &Version, dry_run: bool) -> Result<()> {
        let patterns = Self::family_patterns(version);
        info!("Removing packages matching {}", patterns.join(" "));
        self.package_manager.remove(&patterns, dry_run)?.into_result()?;
        Ok(())
    }
}
