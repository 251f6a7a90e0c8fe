//! Run configuration.
//!
//! Built once from command line flags and handed by reference to every
//! controller. The download location lives here and nowhere else.

use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};

use crate::domain::Version;
use crate::runtime::Runtime;

pub const DEFAULT_MIRROR: &str = "https://download.documentfoundation.org";

/// Name of the directory the installation archive unpacks its packages into.
pub const STAGING_DIR_NAME: &str = "DEBS";

/// Package name prefix of the main product family, e.g. `libreoffice7.4`.
pub const PRODUCT_PACKAGE_PREFIX: &str = "libreoffice";

/// Package name prefix of the auxiliary base family, e.g. `libobasis7.4`.
pub const BASE_PACKAGE_PREFIX: &str = "libobasis";

/// CPU architecture naming used by the download mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchTarget {
    X86_64,
    Aarch64,
}

impl ArchTarget {
    /// Detect the current architecture.
    pub fn detect() -> Result<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            Ok(ArchTarget::X86_64)
        }
        #[cfg(target_arch = "aarch64")]
        {
            Ok(ArchTarget::Aarch64)
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            bail!(
                "No Debian packages are published for {}",
                std::env::consts::ARCH
            )
        }
    }

    /// Directory component in the archive URL.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArchTarget::X86_64 => "x86_64",
            ArchTarget::Aarch64 => "aarch64",
        }
    }

    /// Architecture tag in the archive file name.
    pub fn file_tag(&self) -> &'static str {
        match self {
            ArchTarget::X86_64 => "x86-64",
            ArchTarget::Aarch64 => "aarch64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Base URL of the download mirror, without trailing slash.
    pub mirror_url: String,
    pub download_dir: PathBuf,
    pub arch: ArchTarget,
    pub dry_run: bool,
    pub use_latest_version: bool,
}

impl UpdaterConfig {
    pub fn new(mirror_url: impl Into<String>, download_dir: PathBuf, arch: ArchTarget) -> Self {
        Self {
            mirror_url: mirror_url.into().trim_end_matches('/').to_string(),
            download_dir,
            arch,
            dry_run: false,
            use_latest_version: false,
        }
    }

    /// The stable listing page.
    pub fn listing_url(&self) -> String {
        format!("{}/libreoffice/stable/", self.mirror_url)
    }

    pub fn archive_file_name(&self, version: &Version) -> String {
        format!(
            "LibreOffice_{}_Linux_{}_deb.tar.gz",
            version,
            self.arch.file_tag()
        )
    }

    pub fn archive_url(&self, version: &Version) -> String {
        format!(
            "{}/libreoffice/stable/{}/deb/{}/{}",
            self.mirror_url,
            version,
            self.arch.dir_name(),
            self.archive_file_name(version)
        )
    }

    /// The checksum file published next to the archive.
    pub fn checksum_url(&self, version: &Version) -> String {
        format!("{}.sha256", self.archive_url(version))
    }

    /// Where a downloaded archive for `version` is stored.
    pub fn archive_path(&self, version: &Version) -> PathBuf {
        self.download_dir.join(self.archive_file_name(version))
    }

    /// Fixed extraction target for the archive's packages.
    pub fn staging_dir(&self) -> PathBuf {
        self.download_dir.join(STAGING_DIR_NAME)
    }
}

/// Resolve the download directory: explicit value, then the user's download
/// directory, then the current directory. Relative paths are made absolute.
#[tracing::instrument(skip(runtime))]
pub fn resolve_download_dir<R: Runtime>(runtime: &R, explicit: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => match runtime.download_dir() {
            Some(dir) => dir,
            None => runtime.current_dir()?,
        },
    };
    let dir = absolute(runtime, &dir)?;
    info!("Using download directory: {}", dir.display());
    Ok(dir)
}

/// For install-only runs the archive's own directory becomes the download
/// directory, so extraction lands next to it.
#[tracing::instrument(skip(runtime))]
pub fn archive_download_dir<R: Runtime>(runtime: &R, archive: &Path) -> Result<PathBuf> {
    if !runtime.exists(archive) {
        bail!(
            "The provided archive {} does not exist.",
            absolute(runtime, archive)?.display()
        );
    }
    let archive = absolute(runtime, archive)?;
    archive
        .parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Archive path {:?} has no parent directory", archive))
}

fn absolute<R: Runtime>(runtime: &R, path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(runtime.current_dir()?.join(path))
    }
}
