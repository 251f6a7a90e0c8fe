//! Transfer and unpacking of installation archives.

mod tar_gz;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::path::{Path, PathBuf};

use crate::http::HttpClient;
use crate::runtime::Runtime;

pub use tar_gz::TarGzExtractor;

/// Moves archives from the mirror to disk and unpacks them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download `url` into `dest_dir`, returning the written file's path.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;

    /// Download a small text resource such as a checksum file.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Check that `url` exists without transferring it.
    async fn probe_exists(&self, url: &str) -> Result<bool>;

    /// Unpack `archive` into `dest_dir`, or only list its entries when
    /// `list_only` is set. Returns the entry paths as they land on disk,
    /// relative to `dest_dir`.
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        strip_top_level: bool,
        list_only: bool,
    ) -> Result<Vec<PathBuf>>;
}

/// [`ArchiveFetcher`] backed by the HTTP client and an in-process tar reader.
pub struct HttpArchiveFetcher<'a, R: Runtime> {
    runtime: &'a R,
    http_client: HttpClient,
    extractor: TarGzExtractor,
}

impl<'a, R: Runtime> HttpArchiveFetcher<'a, R> {
    pub fn new(runtime: &'a R, http_client: HttpClient) -> Self {
        Self {
            runtime,
            http_client,
            extractor: TarGzExtractor,
        }
    }
}

/// Last path segment of a URL, used as the local file name.
pub fn file_name_from_url(url: &str) -> Result<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .with_context(|| format!("Cannot derive a file name from {}", url))
}

#[async_trait]
impl<'a, R: Runtime> ArchiveFetcher for HttpArchiveFetcher<'a, R> {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let path = dest_dir.join(file_name_from_url(url)?);
        info!("Downloading {} to {}...", url, path.display());

        self.http_client
            .download_file(url, || {
                self.runtime
                    .create_file(&path)
                    .with_context(|| format!("Failed to create file at {:?}", path))
            })
            .await?;

        info!("Download complete.");
        Ok(path)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.http_client.get_text(url).await
    }

    #[tracing::instrument(skip(self))]
    async fn probe_exists(&self, url: &str) -> Result<bool> {
        self.http_client.exists(url).await
    }

    #[tracing::instrument(skip(self))]
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        strip_top_level: bool,
        list_only: bool,
    ) -> Result<Vec<PathBuf>> {
        if list_only {
            self.extractor.list(self.runtime, archive, strip_top_level)
        } else {
            self.extractor
                .extract(self.runtime, archive, dest_dir, strip_top_level)
        }
    }
}
