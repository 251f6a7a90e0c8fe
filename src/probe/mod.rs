//! Discovery of installed and published versions.

mod installed;
mod remote;

pub use installed::InstalledVersionProbe;
pub use remote::RemoteVersionProbe;
