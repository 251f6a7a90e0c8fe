//! Application layer - the update workflow driven by the command line.
//!
//! This layer sequences the version probes and step controllers for the
//! selected mode and handles every interaction with the operator.

mod workflow;

pub use workflow::{MAX_DOWNLOAD_ATTEMPTS, Mode, Workflow};
