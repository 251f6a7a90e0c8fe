//! Running external tools.
//!
//! Programs are always started from an argument vector. Nothing is passed
//! through a shell, so versions and paths are never interpreted.

use anyhow::{Context, Result};
use log::debug;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_impl(&self, program: &str, args: &[String]) -> Result<Option<i32>> {
        debug!("Running {} {:?}", program, args);
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start {}", program))?;
        Ok(status.code())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn output_impl(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!("Running {} {:?} (captured)", program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to start {}", program))?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
