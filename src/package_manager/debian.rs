use anyhow::{Result, bail};
use log::debug;
use std::path::{Path, PathBuf};

use super::{InstalledPackage, PackageManager, ToolStatus};
use crate::error::ExternalToolFailure;
use crate::runtime::Runtime;

const DPKG_QUERY: &str = "dpkg-query";
const APT_GET: &str = "apt-get";
const DPKG: &str = "dpkg";
const SUDO: &str = "sudo";

/// `dpkg-query`, `apt-get` and `dpkg` driven through the runtime.
///
/// Mutating commands are run through `sudo` when the process is not
/// privileged. Simulations never are.
pub struct DebianPackageManager<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> DebianPackageManager<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn run_tool(&self, tool: &str, args: Vec<String>, dry_run: bool) -> Result<ToolStatus> {
        let code = if dry_run || self.runtime.is_privileged() {
            self.runtime.run(tool, &args)?
        } else {
            let mut sudo_args = Vec::with_capacity(args.len() + 1);
            sudo_args.push(tool.to_string());
            sudo_args.extend(args);
            self.runtime.run(SUDO, &sudo_args)?
        };
        Ok(ToolStatus {
            tool: tool.to_string(),
            code,
        })
    }

    fn package_files(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .runtime
            .read_dir(directory)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "deb"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl<R: Runtime> PackageManager for DebianPackageManager<'_, R> {
    #[tracing::instrument(skip(self))]
    fn query_installed(&self, name_pattern: &str) -> Result<Vec<InstalledPackage>> {
        let args = vec![
            "-W".to_string(),
            "-f=${Package}\t${Version}\t${db:Status-Abbrev}\n".to_string(),
            name_pattern.to_string(),
        ];
        let output = self.runtime.output(DPKG_QUERY, &args)?;

        // dpkg-query exits with 1 when nothing matches the pattern.
        if output.code == Some(1) && output.stdout.trim().is_empty() {
            debug!("No packages match {}", name_pattern);
            return Ok(Vec::new());
        }
        if !output.success() {
            return Err(ExternalToolFailure {
                tool: DPKG_QUERY.to_string(),
                code: output.code,
            }
            .into());
        }

        Ok(parse_query_output(&output.stdout))
    }

    #[tracing::instrument(skip(self))]
    fn remove(&self, patterns: &[String], dry_run: bool) -> Result<ToolStatus> {
        let mut args = vec!["remove".to_string()];
        if dry_run {
            args.push("--simulate".to_string());
        }
        args.extend(patterns.iter().cloned());
        self.run_tool(APT_GET, args, dry_run)
    }

    #[tracing::instrument(skip(self))]
    fn install_all(&self, directory: &Path, dry_run: bool) -> Result<ToolStatus> {
        let files = self.package_files(directory)?;
        if files.is_empty() {
            bail!("No .deb packages found in {}", directory.display());
        }
        debug!("Installing {} package file(s)", files.len());

        let mut args = vec!["-i".to_string()];
        if dry_run {
            args.push("--dry-run".to_string());
        }
        args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
        self.run_tool(DPKG, args, dry_run)
    }
}

/// Parse `name<TAB>version<TAB>status` lines, keeping installed packages only.
fn parse_query_output(stdout: &str) -> Vec<InstalledPackage> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.trim();
            let version = fields.next()?.trim();
            let status = fields.next().unwrap_or("ii").trim();
            if name.is_empty() || version.is_empty() || !status.starts_with("ii") {
                return None;
            }
            Some(InstalledPackage {
                name: name.to_string(),
                version: version.to_string(),
            })
        })
        .collect()
}
