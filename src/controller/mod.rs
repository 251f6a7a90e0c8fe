//! Steps of an update run: download, removal and installation.
//!
//! Each controller performs one step and reports the outcome. Prompting and
//! retry policy live in the workflow.

mod download;
mod install;
mod removal;

pub use download::{DownloadController, parse_checksum_file, verify_checksum};
pub use install::InstallController;
pub use removal::RemovalController;
