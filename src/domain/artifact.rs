use std::path::PathBuf;

use super::version::Version;

/// A downloaded (or, in dry-run mode, merely located) installation archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub target_version: Version,
    pub local_path: PathBuf,
    pub expected_checksum: String,
    pub actual_checksum: Option<String>,
}

impl DownloadArtifact {
    /// True only when both checksums are known and equal.
    pub fn is_verified(&self) -> bool {
        match &self.actual_checksum {
            Some(actual) => !self.expected_checksum.is_empty() && *actual == self.expected_checksum,
            None => false,
        }
    }
}
