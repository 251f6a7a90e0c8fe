//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over system operations,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Well-known directories and privilege
//! - `fs` - File system operations (read, write, rename, directory)
//! - `process` - Running external tools from an argument vector
//! - `user` - Operator interaction (confirmation and selection prompts)

mod env;
mod fs;
mod process;
mod user;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use process::CommandOutput;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn download_dir(&self) -> Option<PathBuf>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>>;

    // Privilege
    fn is_privileged(&self) -> bool;

    // Processes
    /// Run a program with inherited stdio and return its exit code.
    /// `None` means the process was terminated by a signal.
    fn run(&self, program: &str, args: &[String]) -> Result<Option<i32>>;

    /// Run a program and capture its standard output.
    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    // User interaction
    /// Ask a yes/no question. Empty input answers with `default`.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Ask the operator to pick one of `choices`, returning its index.
    /// Empty input picks `default` when one is given.
    fn select(&self, prompt: &str, choices: &[String], default: Option<usize>) -> Result<usize>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn download_dir(&self) -> Option<PathBuf> {
        self.download_dir_impl()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        self.open_impl(path)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }

    fn run(&self, program: &str, args: &[String]) -> Result<Option<i32>> {
        self.run_impl(program, args)
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.output_impl(program, args)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.confirm_impl(prompt, default)
    }

    fn select(&self, prompt: &str, choices: &[String], default: Option<usize>) -> Result<usize> {
        self.select_impl(prompt, choices, default)
    }
}
