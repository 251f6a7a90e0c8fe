//! Access to the operating system's package tools.

mod debian;

use anyhow::Result;
use std::path::Path;

use crate::error::ExternalToolFailure;

pub use debian::DebianPackageManager;

/// Exit status of a package tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub tool: String,
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into an [`ExternalToolFailure`].
    pub fn into_result(self) -> Result<(), ExternalToolFailure> {
        if self.success() {
            Ok(())
        } else {
            Err(ExternalToolFailure {
                tool: self.tool,
                code: self.code,
            })
        }
    }
}

/// An installed package record as reported by the package database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageManager: Send + Sync {
    /// Installed packages whose names match the shell-style `name_pattern`.
    fn query_installed(&self, name_pattern: &str) -> Result<Vec<InstalledPackage>>;

    /// Remove every package matching `patterns`. With `dry_run` the tool's
    /// own simulate flag is used.
    fn remove(&self, patterns: &[String], dry_run: bool) -> Result<ToolStatus>;

    /// Install every package file in `directory`. With `dry_run` the tool's
    /// own dry-run flag is used.
    fn install_all(&self, directory: &Path, dry_run: bool) -> Result<ToolStatus>;
}
