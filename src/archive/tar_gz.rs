use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use log::debug;
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use crate::runtime::Runtime;

/// Reader for `.tar.gz` installation archives.
pub struct TarGzExtractor;

impl TarGzExtractor {
    pub fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    /// List entry paths without writing anything.
    #[tracing::instrument(skip(self, runtime))]
    pub fn list<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        strip_top_level: bool,
    ) -> Result<Vec<PathBuf>> {
        self.walk(runtime, archive_path, strip_top_level, None)
    }

    /// Unpack into `extract_to`, creating it when missing.
    #[tracing::instrument(skip(self, runtime))]
    pub fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
        strip_top_level: bool,
    ) -> Result<Vec<PathBuf>> {
        debug!("Extracting tar.gz archive to {:?}...", extract_to);
        runtime.create_dir_all(extract_to)?;
        self.walk(runtime, archive_path, strip_top_level, Some(extract_to))
    }

    fn walk<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        strip_top_level: bool,
        extract_to: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        if !self.can_handle(archive_path) {
            bail!("Unsupported archive format: {}", archive_path.display());
        }

        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut entries_seen = Vec::new();
        for entry in archive
            .entries()
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?
        {
            let mut entry = entry.context("Corrupt archive entry")?;
            let raw_path = entry.path().context("Invalid path in archive")?.into_owned();
            let Some(relative) = sanitize_entry_path(&raw_path, strip_top_level)? else {
                continue;
            };

            let entry_type = entry.header().entry_type();
            if let Some(root) = extract_to {
                let target = root.join(&relative);
                match entry_type {
                    EntryType::Directory => runtime.create_dir_all(&target)?,
                    EntryType::Regular | EntryType::Continuous => {
                        if let Some(parent) = target.parent() {
                            runtime.create_dir_all(parent)?;
                        }
                        let mut writer = runtime.create_file(&target)?;
                        io::copy(&mut entry, &mut writer)
                            .with_context(|| format!("Failed to write {:?}", target))?;
                    }
                    other => {
                        debug!("Skipping {:?} entry {:?}", other, raw_path);
                        continue;
                    }
                }
            }
            entries_seen.push(relative);
        }

        Ok(entries_seen)
    }
}

/// Normalise an entry path, optionally dropping its first component.
///
/// Returns `None` for the stripped top-level directory itself. Paths that
/// would escape the destination are rejected.
fn sanitize_entry_path(path: &Path, strip_top_level: bool) -> Result<Option<PathBuf>> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("Archive entry {:?} escapes the extraction directory", path)
            }
        }
    }

    let parts = if strip_top_level {
        parts.into_iter().skip(1).collect::<Vec<_>>()
    } else {
        parts
    };
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.iter().collect()))
}
