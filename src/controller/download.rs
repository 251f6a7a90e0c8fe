use std::io;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::archive::ArchiveFetcher;
use crate::config::UpdaterConfig;
use crate::domain::{DownloadArtifact, Version};
use crate::error::DownloadError;
use crate::runtime::Runtime;

/// Fetches and verifies the installation archive for one version.
///
/// A checksum mismatch is returned to the caller, which decides whether to
/// try again. The corrupt file is left where it was written.
pub struct DownloadController<'a, R: Runtime> {
    runtime: &'a R,
    fetcher: &'a dyn ArchiveFetcher,
    config: &'a UpdaterConfig,
}

impl<'a, R: Runtime> DownloadController<'a, R> {
    pub fn new(runtime: &'a R, fetcher: &'a dyn ArchiveFetcher, config: &'a UpdaterConfig) -> Self {
        Self {
            runtime,
            fetcher,
            config,
        }
    }

    /// Download the archive for `version` into the download directory.
    ///
    /// In dry-run mode the archive is only checked for existence and nothing
    /// is written; the returned artifact then carries no actual checksum.
    #[tracing::instrument(skip(self))]
    pub async fn download(
        &self,
        version: &Version,
        dry_run: bool,
    ) -> Result<DownloadArtifact, DownloadError> {
        let archive_url = self.config.archive_url(version);
        let checksum_url = self.config.checksum_url(version);

        debug!("Fetching checksum from {}", checksum_url);
        let checksum_file = self
            .fetcher
            .fetch_text(&checksum_url)
            .await
            .with_context(|| format!("Failed to fetch checksum file {}", checksum_url))?;
        let expected_checksum = parse_checksum_file(&checksum_file)?;

        if dry_run {
            if !self.fetcher.probe_exists(&archive_url).await? {
                return Err(anyhow!("Archive {} is not available on the mirror", archive_url).into());
            }
            info!("Dry run: {} exists, not downloading", archive_url);
            return Ok(DownloadArtifact {
                target_version: version.clone(),
                local_path: self.config.archive_path(version),
                expected_checksum,
                actual_checksum: None,
            });
        }

        self.runtime.create_dir_all(&self.config.download_dir)?;
        let local_path = self
            .fetcher
            .fetch(&archive_url, &self.config.download_dir)
            .await?;
        let actual_checksum = self.sha256_of(&local_path)?;
        verify_checksum(&expected_checksum, &actual_checksum, &local_path)?;

        info!("Checksum verified: {}", actual_checksum);
        Ok(DownloadArtifact {
            target_version: version.clone(),
            local_path,
            expected_checksum,
            actual_checksum: Some(actual_checksum),
        })
    }

    fn sha256_of(&self, path: &Path) -> anyhow::Result<String> {
        let mut reader = self
            .runtime
            .open(path)
            .with_context(|| format!("Cannot read {} for checksum calculation", path.display()))?;
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)
            .with_context(|| format!("Failed to hash {}", path.display()))?;
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// The expected checksum is the first whitespace-delimited token.
pub fn parse_checksum_file(content: &str) -> anyhow::Result<String> {
    match content.split_whitespace().next() {
        Some(token) => Ok(token.to_ascii_lowercase()),
        None => bail!("Checksum file is empty"),
    }
}

pub fn verify_checksum(expected: &str, actual: &str, path: &Path) -> Result<(), DownloadError> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(DownloadError::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
            path: path.to_path_buf(),
        })
    }
}
