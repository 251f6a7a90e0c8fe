use super::state::{InstalledState, RemoteState};
use super::version::Version;

/// What a run should do, given installed and published versions.
///
/// `update_available` is true exactly when `candidates` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub installed_any: bool,
    pub has_multiple: bool,
    pub update_available: bool,
    /// Published versions newer than the newest installed one, ascending.
    pub candidates: Vec<Version>,
}

impl UpdateDecision {
    pub fn compute(installed: &InstalledState, remote: &RemoteState) -> Self {
        let installed_any = installed.is_installed();
        let has_multiple = installed.has_multiple();

        // Never claim an update without having looked.
        if !remote.was_checked() {
            return Self {
                installed_any,
                has_multiple,
                update_available: false,
                candidates: Vec::new(),
            };
        }

        let greatest = installed.greatest();
        let candidates: Vec<Version> = remote
            .published()
            .iter()
            .filter(|v| **v > greatest)
            .cloned()
            .collect();

        Self {
            installed_any,
            has_multiple,
            update_available: greatest < *remote.latest(),
            candidates,
        }
    }

    /// The newest candidate, picked when the operator asks for the latest version.
    pub fn latest_candidate(&self) -> Option<&Version> {
        self.candidates.last()
    }
}
