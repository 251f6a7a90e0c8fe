//! Update workflow - sequences the probes and controllers for one run.
//!
//! This is the only place that talks to the operator: it prints the version
//! lists, asks which version to download or remove, and owns the checksum
//! retry policy.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::{debug, warn};

use crate::archive::ArchiveFetcher;
use crate::config::UpdaterConfig;
use crate::controller::{DownloadController, InstallController, RemovalController};
use crate::domain::{DownloadArtifact, InstalledState, UpdateDecision, Version};
use crate::error::DownloadError;
use crate::listing::PageLister;
use crate::package_manager::PackageManager;
use crate::probe::{InstalledVersionProbe, RemoteVersionProbe};
use crate::runtime::Runtime;

/// Upper bound on download attempts when checksums keep failing.
pub const MAX_DOWNLOAD_ATTEMPTS: usize = 5;

/// What a run should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    CheckOnly,
    DownloadOnly,
    RemoveOnly,
    /// Install from an archive that is already on disk.
    InstallOnly(PathBuf),
    FullUpdate,
}

pub struct Workflow<'a, R: Runtime> {
    runtime: &'a R,
    lister: &'a dyn PageLister,
    package_manager: &'a dyn PackageManager,
    fetcher: &'a dyn ArchiveFetcher,
    config: &'a UpdaterConfig,
}

impl<'a, R: Runtime> Workflow<'a, R> {
    pub fn new(
        runtime: &'a R,
        lister: &'a dyn PageLister,
        package_manager: &'a dyn PackageManager,
        fetcher: &'a dyn ArchiveFetcher,
        config: &'a UpdaterConfig,
    ) -> Self {
        Self {
            runtime,
            lister,
            package_manager,
            fetcher,
            config,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self, mode: &Mode) -> Result<()> {
        match mode {
            Mode::CheckOnly => {
                self.check().await?;
            }
            Mode::DownloadOnly => {
                let (_, decision) = self.check().await?;
                self.download(&decision).await?;
            }
            Mode::RemoveOnly => {
                let (installed, _) = self.survey(true).await?;
                self.remove(&installed)?;
            }
            Mode::InstallOnly(archive) => self.install_external(archive)?,
            Mode::FullUpdate => self.full_update().await?,
        }
        Ok(())
    }

    async fn full_update(&self) -> Result<()> {
        let (installed, decision) = self.check().await?;
        if !decision.update_available {
            return Ok(());
        }

        let Some(artifact) = self.download(&decision).await? else {
            return Ok(());
        };
        self.remove(&installed)?;

        if installed.has_multiple()
            && !self.runtime.confirm(
                "Several versions were installed before this run. Continue with the installation?",
                false,
            )?
        {
            println!("Skipping installation.");
            return Ok(());
        }

        if self.config.dry_run {
            println!(
                "Dry run is enabled, skipping extraction and installation since archive is not downloaded."
            );
            return Ok(());
        }

        self.install_downloaded(&artifact)
    }

    /// Extract and install a freshly downloaded archive.
    fn install_downloaded(&self, artifact: &DownloadArtifact) -> Result<()> {
        if !artifact.is_verified() {
            bail!(
                "Checksum of {} was not verified, refusing to install it",
                artifact.local_path.display()
            );
        }

        let installer = self.installer();
        self.backup_leftover(&installer)?;
        println!("Extracting installation archive...\n");
        installer.extract(&artifact.local_path, false)?;
        println!("\nInstalling packages...\n");
        installer.install(false)
    }

    /// Probe the installed side and, unless `skip_remote` is set, the
    /// listing, then decide.
    async fn survey(&self, skip_remote: bool) -> Result<(InstalledState, UpdateDecision)> {
        let installed = InstalledVersionProbe::new(self.package_manager).probe()?;
        let remote = RemoteVersionProbe::new(self.lister, self.config)
            .probe(skip_remote)
            .await?;
        let decision = UpdateDecision::compute(&installed, &remote);
        Ok((installed, decision))
    }

    /// Probe both sides, print what was found and decide.
    async fn check(&self) -> Result<(InstalledState, UpdateDecision)> {
        let (installed, decision) = self.survey(false).await?;

        print_installed(&installed);
        if decision.update_available {
            println!("The following new versions are found:");
            print_numbered(&decision.candidates, 1);
        } else {
            println!("No available updates found.");
        }
        Ok((installed, decision))
    }

    /// Let the operator pick a candidate and download it, retrying on
    /// checksum mismatch for as long as the operator agrees.
    async fn download(&self, decision: &UpdateDecision) -> Result<Option<DownloadArtifact>> {
        let Some(version) = self.select_download(decision)? else {
            return Ok(None);
        };
        println!(
            "LibreOffice version {} will be downloaded to {}\n",
            version,
            self.config.download_dir.display()
        );

        let controller = DownloadController::new(self.runtime, self.fetcher, self.config);
        let mut attempt = 1;
        loop {
            let err = match controller.download(&version, self.config.dry_run).await {
                Ok(artifact) => return Ok(Some(artifact)),
                Err(DownloadError::Other(e)) => return Err(e),
                Err(err) => err,
            };

            if let DownloadError::ChecksumMismatch {
                expected,
                actual,
                path,
            } = &err
            {
                println!(
                    "Archive downloaded with mismatched checksum ({} instead of {})",
                    actual, expected
                );
                self.discard(path)?;
            }

            let retry = attempt < MAX_DOWNLOAD_ATTEMPTS
                && self.runtime.confirm("Redownload archive?", true)?;
            if !retry {
                println!("Archive download failed. Quitting.");
                return Err(err.into());
            }
            attempt += 1;
            debug!("Download attempt {} of {}", attempt, MAX_DOWNLOAD_ATTEMPTS);
        }
    }

    fn select_download(&self, decision: &UpdateDecision) -> Result<Option<Version>> {
        let candidates = &decision.candidates;
        if candidates.is_empty() {
            return Ok(None);
        }
        if self.config.use_latest_version {
            return Ok(decision.latest_candidate().cloned());
        }

        let choices: Vec<String> = (1..=candidates.len()).map(|i| i.to_string()).collect();
        let index = self.runtime.select(
            "Select version to download",
            &choices,
            Some(candidates.len() - 1),
        )?;
        Ok(candidates.get(index).cloned())
    }

    /// Remove a corrupt download so the next attempt starts clean.
    fn discard(&self, path: &Path) -> Result<()> {
        if self.runtime.exists(path) {
            self.runtime.remove_file(path)?;
        } else {
            warn!("Corrupt download {} is already gone", path.display());
        }
        Ok(())
    }

    /// Ask which installed version to remove and remove its release line.
    fn remove(&self, installed: &InstalledState) -> Result<Option<Version>> {
        print_installed(installed);

        let selected = if installed.has_multiple() {
            let versions = installed.versions();
            let mut choices: Vec<String> = (1..=versions.len()).map(|i| i.to_string()).collect();
            choices.push("skip".to_string());
            let index = self
                .runtime
                .select("Select version to remove", &choices, None)?;
            // The last choice is "skip".
            versions.get(index).map(|v| (*v).clone())
        } else if installed.is_installed() {
            if self
                .runtime
                .confirm("Are you sure you want to continue with the removal?", false)?
            {
                Some(installed.greatest())
            } else {
                None
            }
        } else {
            println!("Skipping removal step.\n");
            None
        };

        if let Some(version) = &selected {
            RemovalController::new(self.package_manager).remove(version, self.config.dry_run)?;
        }
        Ok(selected)
    }

    /// Install from an archive supplied on the command line.
    fn install_external(&self, archive: &Path) -> Result<()> {
        let installer = self.installer();

        let mut list_only = self.config.dry_run;
        if self.config.dry_run {
            println!(
                "You have enabled dry run option. Do you want to extract the archive to the disk? \
                 Extracting it allows you to dry run the dpkg installation command. If you choose \
                 to not extract, the simulation will only run until listing the content of the archive."
            );
            if self.runtime.confirm("Extract archive for real?", false)? {
                self.backup_leftover(&installer)?;
                list_only = false;
            }
        } else {
            self.backup_leftover(&installer)?;
        }

        println!("Extracting installation archive...\n");
        let entries = installer.extract(archive, list_only)?;
        if list_only {
            for entry in &entries {
                println!("{}", entry.display());
            }
            return Ok(());
        }

        println!("\nInstalling packages...\n");
        installer.install(self.config.dry_run)
    }

    fn installer(&self) -> InstallController<'a, R> {
        InstallController::new(self.runtime, self.fetcher, self.package_manager, self.config)
    }

    fn backup_leftover(&self, installer: &InstallController<'a, R>) -> Result<()> {
        let staging = self.config.staging_dir();
        if self.runtime.exists(&staging) {
            println!("Old extracted archive folder exists, renaming old folder...");
        }
        if let Some(backup) = installer.backup_leftover()? {
            println!("Renamed {} to {}.", staging.display(), backup.display());
        }
        Ok(())
    }
}

fn print_installed(installed: &InstalledState) {
    let versions = installed.versions();
    match versions.as_slice() {
        [] => println!("LibreOffice is not installed."),
        [only] => println!("Version {} is installed.", only),
        many => {
            println!("The following versions have been installed:");
            print_numbered(many, 1);
        }
    }
}

fn print_numbered<T: Display>(items: &[T], indent: usize) {
    let tabs = "\t".repeat(indent);
    for (i, item) in items.iter().enumerate() {
        println!("{}{}) {}", tabs, i + 1, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MockArchiveFetcher;
    use crate::config::ArchTarget;
    use crate::listing::MockPageLister;
    use crate::package_manager::{InstalledPackage, MockPackageManager, ToolStatus};
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_download_dir;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use sha2::{Digest, Sha256};
    use std::io::Cursor;

    fn config(dry_run: bool, use_latest_version: bool) -> UpdaterConfig {
        let mut config = UpdaterConfig::new(
            "https://mirror.example.org",
            test_download_dir(),
            ArchTarget::X86_64,
        );
        config.dry_run = dry_run;
        config.use_latest_version = use_latest_version;
        config
    }

    fn lister(published: &[&str]) -> MockPageLister {
        let entries: Vec<String> = published.iter().map(|v| format!("{}/", v)).collect();
        let mut lister = MockPageLister::new();
        lister
            .expect_list_entries()
            .returning(move |_| Ok(entries.clone()));
        lister
    }

    /// Package manager reporting the given `libreoffice<M.m>` versions.
    fn package_manager(installed: &[&str]) -> MockPackageManager {
        let packages: Vec<InstalledPackage> = installed
            .iter()
            .map(|v| {
                let version = Version::parse(v).unwrap();
                InstalledPackage {
                    name: format!("libreoffice{}", version.family()),
                    version: v.to_string(),
                }
            })
            .collect();
        let mut pm = MockPackageManager::new();
        pm.expect_query_installed()
            .with(eq("libreoffice*"))
            .returning(move |_| Ok(packages.clone()));
        pm
    }

    fn ok(tool: &str) -> ToolStatus {
        ToolStatus {
            tool: tool.to_string(),
            code: Some(0),
        }
    }

    fn archive_path(version: &str) -> PathBuf {
        test_download_dir().join(format!("LibreOffice_{}_Linux_x86-64_deb.tar.gz", version))
    }

    fn sha256_hex(data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }

    #[tokio::test]
    async fn test_check_only_touches_nothing() {
        let lister = lister(&["7.3.7", "7.4.7", "7.5.0"]);
        let pm = package_manager(&["7.3.7.2-1", "7.4.7.2-2"]);
        let fetcher = MockArchiveFetcher::new();
        let runtime = MockRuntime::new();
        let config = config(false, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::CheckOnly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_update_without_update_stops_after_check() {
        let lister = lister(&["7.5.7", "7.6.1"]);
        let pm = package_manager(&["7.6.1.2-2"]);
        let fetcher = MockArchiveFetcher::new();
        let runtime = MockRuntime::new();
        let config = config(false, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::FullUpdate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_update_dry_run_on_clean_system() {
        let lister = lister(&["7.5.7"]);
        let mut pm = package_manager(&[]);
        pm.expect_remove().never();
        pm.expect_install_all().never();

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|_| Ok("abcd1234  LibreOffice_7.5.7_Linux_x86-64_deb.tar.gz".into()));
        fetcher.expect_probe_exists().times(1).returning(|_| Ok(true));
        fetcher.expect_fetch().never();
        fetcher.expect_extract().never();

        let runtime = MockRuntime::new();
        let config = config(true, true);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::FullUpdate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_download_prompts_with_latest_as_default() {
        let lister = lister(&["7.5.7", "7.6.0", "7.6.1"]);
        let pm = package_manager(&["7.5.7.1-1"]);

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .with(eq(format!(
                "https://mirror.example.org/libreoffice/stable/7.6.0/deb/x86_64/{}.sha256",
                "LibreOffice_7.6.0_Linux_x86-64_deb.tar.gz"
            )))
            .returning(|_| Ok("abcd1234".into()));
        fetcher.expect_probe_exists().returning(|_| Ok(true));

        let mut runtime = MockRuntime::new();
        runtime
            .expect_select()
            .withf(|prompt, choices, default| {
                prompt == "Select version to download"
                    && choices == ["1".to_string(), "2".to_string()]
                    && *default == Some(1)
            })
            .times(1)
            .returning(|_, _, _| Ok(0));
        let config = config(true, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::DownloadOnly)
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_checksum_mismatch_retried_on_request() {
        let good = sha256_hex(b"archive bytes");
        let lister = lister(&["7.6.1"]);
        let pm = package_manager(&[]);

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .times(2)
            .returning(move |_| Ok(good.clone()));
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(archive_path("7.6.1")));

        let mut seq = Sequence::new();
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_open()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Box::new(Cursor::new(b"truncated".to_vec()))));
        runtime
            .expect_exists()
            .with(eq(archive_path("7.6.1")))
            .returning(|_| true);
        runtime
            .expect_remove_file()
            .with(eq(archive_path("7.6.1")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_confirm()
            .with(eq("Redownload archive?"), eq(true))
            .times(1)
            .returning(|_, _| Ok(true));
        runtime
            .expect_open()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Box::new(Cursor::new(b"archive bytes".to_vec()))));
        let config = config(false, true);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::DownloadOnly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_checksum_mismatch_declined_is_terminal() {
        let lister = lister(&["7.6.1"]);
        let mut pm = package_manager(&["7.5.7.1-1"]);
        pm.expect_remove().never();
        pm.expect_install_all().never();

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|_| Ok("abcd1234".into()));
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(archive_path("7.6.1")));
        fetcher.expect_extract().never();

        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_open()
            .returning(|_| Ok(Box::new(Cursor::new(b"archive bytes".to_vec()))));
        runtime.expect_exists().returning(|_| true);
        runtime.expect_remove_file().returning(|_| Ok(()));
        runtime
            .expect_confirm()
            .with(eq("Redownload archive?"), eq(true))
            .returning(|_, _| Ok(false));
        let config = config(false, true);

        let err = Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::FullUpdate)
            .await
            .unwrap_err();

        match err.downcast_ref::<DownloadError>() {
            Some(DownloadError::ChecksumMismatch { expected, .. }) => {
                assert_eq!(expected, "abcd1234")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_checksum_retries_are_bounded() {
        let lister = lister(&["7.6.1"]);
        let pm = package_manager(&[]);

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(|_| Ok("abcd1234".into()));
        fetcher
            .expect_fetch()
            .times(MAX_DOWNLOAD_ATTEMPTS)
            .returning(|_, _| Ok(archive_path("7.6.1")));

        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_open()
            .returning(|_| Ok(Box::new(Cursor::new(b"archive bytes".to_vec()))));
        runtime.expect_exists().returning(|_| true);
        runtime.expect_remove_file().returning(|_| Ok(()));
        runtime
            .expect_confirm()
            .times(MAX_DOWNLOAD_ATTEMPTS - 1)
            .returning(|_, _| Ok(true));
        let config = config(false, true);

        let result = Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::DownloadOnly)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_only_single_version_confirmed() {
        let lister = MockPageLister::new();
        let mut pm = package_manager(&["7.4.7.2-2"]);
        pm.expect_remove()
            .with(
                eq(vec!["libreoffice7.4*".to_string(), "libobasis7.4*".to_string()]),
                eq(true),
            )
            .times(1)
            .returning(|_, _| Ok(ok("apt-get")));
        let fetcher = MockArchiveFetcher::new();

        let mut runtime = MockRuntime::new();
        runtime
            .expect_confirm()
            .with(
                eq("Are you sure you want to continue with the removal?"),
                eq(false),
            )
            .returning(|_, _| Ok(true));
        let config = config(true, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::RemoveOnly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_only_never_reads_listing() {
        let mut lister = MockPageLister::new();
        lister.expect_list_entries().never();
        let pm = package_manager(&[]);
        let fetcher = MockArchiveFetcher::new();
        let runtime = MockRuntime::new();
        let config = config(false, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::RemoveOnly)
            .await
            .unwrap();
    }

    #[test]
    fn test_unverified_artifact_is_never_extracted() {
        let lister = MockPageLister::new();
        let mut pm = MockPackageManager::new();
        pm.expect_install_all().never();
        let mut fetcher = MockArchiveFetcher::new();
        fetcher.expect_extract().never();
        let runtime = MockRuntime::new();
        let config = config(false, false);

        let artifact = DownloadArtifact {
            target_version: Version::parse("7.5.0").unwrap(),
            local_path: archive_path("7.5.0"),
            expected_checksum: "abcd1234".to_string(),
            actual_checksum: None,
        };

        let err = Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .install_downloaded(&artifact)
            .unwrap_err();
        assert!(err.to_string().contains("was not verified"));
    }

    #[tokio::test]
    async fn test_remove_only_multiple_versions_skip() {
        let lister = MockPageLister::new();
        let mut pm = package_manager(&["7.3.7.2-1", "7.4.7.2-2"]);
        pm.expect_remove().never();
        let fetcher = MockArchiveFetcher::new();

        let mut runtime = MockRuntime::new();
        runtime
            .expect_select()
            .withf(|prompt, choices, default| {
                prompt == "Select version to remove"
                    && choices.last().map(String::as_str) == Some("skip")
                    && choices.len() == 3
                    && default.is_none()
            })
            .returning(|_, _, _| Ok(2));
        let config = config(false, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::RemoveOnly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_only_multiple_versions_pick_one() {
        let lister = MockPageLister::new();
        let mut pm = package_manager(&["7.3.7.2-1", "7.4.7.2-2"]);
        pm.expect_remove()
            .withf(|patterns, dry_run| patterns[0] == "libreoffice7.3*" && !*dry_run)
            .times(1)
            .returning(|_, _| Ok(ok("apt-get")));
        let fetcher = MockArchiveFetcher::new();

        let mut runtime = MockRuntime::new();
        runtime.expect_select().returning(|_, _, _| Ok(0));
        let config = config(false, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::RemoveOnly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_update_multiple_installed_requires_confirmation() {
        let lister = lister(&["7.3.7", "7.4.7", "7.5.0"]);
        let mut pm = package_manager(&["7.3.7.2-1", "7.4.7.2-2"]);
        pm.expect_remove().never();
        pm.expect_install_all().never();

        let good = sha256_hex(b"archive bytes");
        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(move |_| Ok(good.clone()));
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(archive_path("7.5.0")));
        fetcher.expect_extract().never();

        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_open()
            .returning(|_| Ok(Box::new(Cursor::new(b"archive bytes".to_vec()))));
        // Skip removal, then decline to continue.
        runtime.expect_select().returning(|_, _, _| Ok(2));
        runtime
            .expect_confirm()
            .withf(|prompt, default| prompt.contains("Continue with the installation") && !*default)
            .times(1)
            .returning(|_, _| Ok(false));
        let config = config(false, true);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::FullUpdate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_update_installs_downloaded_archive() {
        let lister = lister(&["7.4.7", "7.5.0"]);
        let staging = test_download_dir().join("DEBS");

        let mut pm = package_manager(&["7.4.7.2-2"]);
        pm.expect_remove()
            .times(1)
            .returning(|_, _| Ok(ok("apt-get")));
        pm.expect_install_all()
            .with(eq(staging.clone()), eq(false))
            .times(1)
            .returning(|_, _| Ok(ok("dpkg")));

        let good = sha256_hex(b"archive bytes");
        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_fetch_text()
            .returning(move |_| Ok(good.clone()));
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(archive_path("7.5.0")));
        fetcher
            .expect_extract()
            .with(
                eq(archive_path("7.5.0")),
                eq(test_download_dir()),
                eq(true),
                eq(false),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(vec![PathBuf::from("DEBS/libreoffice7.5.deb")]));

        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_open()
            .returning(|_| Ok(Box::new(Cursor::new(b"archive bytes".to_vec()))));
        runtime.expect_confirm().returning(|_, _| Ok(true));
        runtime
            .expect_exists()
            .with(eq(staging.clone()))
            .returning(|_| false);
        let config = config(false, true);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::FullUpdate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_install_only_dry_run_declined_lists_contents() {
        let archive = test_download_dir().join("LibreOffice_7.6.1_Linux_x86-64_deb.tar.gz");
        let lister = MockPageLister::new();
        let mut pm = MockPackageManager::new();
        pm.expect_install_all().never();

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_extract()
            .with(eq(archive.clone()), eq(test_download_dir()), eq(true), eq(true))
            .times(1)
            .returning(|_, _, _, _| Ok(vec![PathBuf::from("DEBS/libreoffice7.6.deb")]));

        let mut runtime = MockRuntime::new();
        runtime
            .expect_confirm()
            .with(eq("Extract archive for real?"), eq(false))
            .times(1)
            .returning(|_, _| Ok(false));
        let config = config(true, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::InstallOnly(archive))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_install_only_dry_run_extracts_for_real_when_asked() {
        let archive = test_download_dir().join("LibreOffice_7.6.1_Linux_x86-64_deb.tar.gz");
        let staging = test_download_dir().join("DEBS");
        let lister = MockPageLister::new();

        let mut pm = MockPackageManager::new();
        pm.expect_install_all()
            .with(eq(staging.clone()), eq(true))
            .times(1)
            .returning(|_, _| Ok(ok("dpkg")));

        let mut fetcher = MockArchiveFetcher::new();
        fetcher
            .expect_extract()
            .withf(|_, _, _, list_only| !*list_only)
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let mut runtime = MockRuntime::new();
        runtime.expect_confirm().returning(|_, _| Ok(true));
        runtime
            .expect_exists()
            .with(eq(staging.clone()))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(test_download_dir().join("DEBS.1")))
            .returning(|_| false);
        runtime
            .expect_rename()
            .with(eq(staging.clone()), eq(test_download_dir().join("DEBS.1")))
            .times(1)
            .returning(|_, _| Ok(()));
        let config = config(true, false);

        Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::InstallOnly(archive))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_install_only_tool_failure_is_fatal() {
        let archive = test_download_dir().join("LibreOffice_7.6.1_Linux_x86-64_deb.tar.gz");
        let lister = MockPageLister::new();

        let mut pm = MockPackageManager::new();
        pm.expect_install_all().returning(|_, _| {
            Ok(ToolStatus {
                tool: "dpkg".into(),
                code: Some(2),
            })
        });

        let mut fetcher = MockArchiveFetcher::new();
        fetcher.expect_extract().returning(|_, _, _, _| Ok(vec![]));

        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        let config = config(false, false);

        let err = Workflow::new(&runtime, &lister, &pm, &fetcher, &config)
            .run(&Mode::InstallOnly(archive))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("dpkg failed with exit code 2"));
    }
}
