//! Domain values - versions and the per-run state derived from them.
//!
//! Nothing here touches the system; every value is computed fresh for a run
//! and owned by the workflow for its duration.

mod artifact;
mod decision;
mod state;
pub mod version;

pub use artifact::DownloadArtifact;
pub use decision::UpdateDecision;
pub use state::{InstalledState, RemoteState};
pub use version::{Version, max_version};
