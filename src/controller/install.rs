use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::archive::ArchiveFetcher;
use crate::config::UpdaterConfig;
use crate::package_manager::PackageManager;
use crate::runtime::Runtime;

/// Unpacks an installation archive into the staging directory and installs
/// the packages found there.
pub struct InstallController<'a, R: Runtime> {
    runtime: &'a R,
    fetcher: &'a dyn ArchiveFetcher,
    package_manager: &'a dyn PackageManager,
    config: &'a UpdaterConfig,
}

impl<'a, R: Runtime> InstallController<'a, R> {
    pub fn new(
        runtime: &'a R,
        fetcher: &'a dyn ArchiveFetcher,
        package_manager: &'a dyn PackageManager,
        config: &'a UpdaterConfig,
    ) -> Self {
        Self {
            runtime,
            fetcher,
            package_manager,
            config,
        }
    }

    /// Move a staging directory left by an earlier run to the first free
    /// `DEBS.N` name. Returns the new name when something was moved.
    #[tracing::instrument(skip(self))]
    pub fn backup_leftover(&self) -> Result<Option<PathBuf>> {
        let staging = self.config.staging_dir();
        if !self.runtime.exists(&staging) {
            return Ok(None);
        }

        let backup = first_free_backup(self.runtime, &staging)?;
        self.runtime
            .rename(&staging, &backup)
            .with_context(|| format!("Failed to move {:?} out of the way", staging))?;
        info!("Renamed {} to {}", staging.display(), backup.display());
        Ok(Some(backup))
    }

    /// Unpack `archive` into the download directory, dropping the archive's
    /// top-level folder so its packages land in the staging directory.
    /// In dry-run mode the entries are only listed.
    #[tracing::instrument(skip(self))]
    pub fn extract(&self, archive: &Path, dry_run: bool) -> Result<Vec<PathBuf>> {
        let entries = self
            .fetcher
            .extract(archive, &self.config.download_dir, true, dry_run)
            .with_context(|| format!("Failed to extract {}", archive.display()))?;
        debug!("{} archive entries", entries.len());
        Ok(entries)
    }

    /// Install every package in the staging directory.
    #[tracing::instrument(skip(self))]
    pub fn install(&self, dry_run: bool) -> Result<()> {
        let staging = self.config.staging_dir();
        self.package_manager
            .install_all(&staging, dry_run)?
            .into_result()?;
        Ok(())
    }
}

fn first_free_backup<R: Runtime>(runtime: &R, staging: &Path) -> Result<PathBuf> {
    let name = staging
        .file_name()
        .with_context(|| format!("Staging path {:?} has no file name", staging))?
        .to_string_lossy()
        .into_owned();

    let mut index = 1u32;
    loop {
        let candidate = staging.with_file_name(format!("{}.{}", name, index));
        if !runtime.exists(&candidate) {
            return Ok(candidate);
        }
        index += 1;
    }
}
