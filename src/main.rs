use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use lo_updater::application::{Mode, Workflow};
use lo_updater::archive::HttpArchiveFetcher;
use lo_updater::config::{
    ArchTarget, DEFAULT_MIRROR, UpdaterConfig, archive_download_dir, resolve_download_dir,
};
use lo_updater::http::HttpClient;
use lo_updater::listing::HtmlPageLister;
use lo_updater::package_manager::DebianPackageManager;
use lo_updater::runtime::RealRuntime;

/// lo-updater - manage the official LibreOffice installation on Debian
///
/// Checks the stable release listing for newer versions, downloads and
/// verifies the installation archive, removes the old release line and
/// installs the new packages. Without a mode flag a full update is run.
#[derive(Parser, Debug)]
#[command(
    author,
    version = env!("LO_UPDATER_VERSION"),
    about,
    long_about,
    after_help = "Set RUST_LOG=info for progress logs."
)]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Update to the latest version instead of prompting which version to
    /// download when several new versions exist
    #[arg(long)]
    use_latest_version: bool,

    /// Let the package tools simulate instead of changing the system, and
    /// do not download the archive
    #[arg(long)]
    dry_run: bool,

    /// Directory for downloaded archives (also via LO_UPDATER_DL_DIR)
    #[arg(
        long = "dl-dir",
        short = 'd',
        env = "LO_UPDATER_DL_DIR",
        value_name = "PATH"
    )]
    dl_dir: Option<PathBuf>,

    /// Download mirror base URL (also via LO_UPDATER_MIRROR)
    #[arg(
        long,
        env = "LO_UPDATER_MIRROR",
        value_name = "URL",
        default_value = DEFAULT_MIRROR
    )]
    mirror: String,
}

#[derive(clap::Args, Debug)]
#[group(multiple = false)]
struct ModeArgs {
    /// Only check if there is an update available
    #[arg(long, short = 'c')]
    check_only: bool,

    /// Only download the newer version, skipping removal and installation
    #[arg(long)]
    download_only: bool,

    /// Remove the existing installation
    #[arg(long)]
    remove_only: bool,

    /// Install a previously downloaded installation archive
    #[arg(long, value_name = "ARCHIVE_FILE")]
    install_only: Option<PathBuf>,
}

impl ModeArgs {
    fn mode(&self) -> Mode {
        if self.check_only {
            Mode::CheckOnly
        } else if self.download_only {
            Mode::DownloadOnly
        } else if self.remove_only {
            Mode::RemoveOnly
        } else if let Some(archive) = &self.install_only {
            Mode::InstallOnly(archive.clone())
        } else {
            Mode::FullUpdate
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    // Install-only runs work next to the given archive.
    let (mode, download_dir) = match cli.mode.mode() {
        Mode::InstallOnly(archive) => {
            let dir = archive_download_dir(&runtime, &archive)
                .unwrap_or_else(|e| Cli::command().error(ErrorKind::ValueValidation, e).exit());
            let file_name = archive
                .file_name()
                .with_context(|| format!("{:?} is not a file", archive))?;
            (Mode::InstallOnly(dir.join(file_name)), dir)
        }
        mode => (mode, resolve_download_dir(&runtime, cli.dl_dir)?),
    };

    let mut config = UpdaterConfig::new(cli.mirror, download_dir, ArchTarget::detect()?);
    config.dry_run = cli.dry_run;
    config.use_latest_version = cli.use_latest_version;

    let http_client = HttpClient::with_user_agent()?;
    let lister = HtmlPageLister::new(http_client.clone());
    let fetcher = HttpArchiveFetcher::new(&runtime, http_client);
    let package_manager = DebianPackageManager::new(&runtime);

    Workflow::new(&runtime, &lister, &package_manager, &fetcher, &config)
        .run(&mode)
        .await
}
