use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::UpdaterConfig;
use crate::domain::{RemoteState, Version};
use crate::listing::PageLister;

/// Reads published versions from the stable listing page.
pub struct RemoteVersionProbe<'a> {
    lister: &'a dyn PageLister,
    config: &'a UpdaterConfig,
}

impl<'a> RemoteVersionProbe<'a> {
    pub fn new(lister: &'a dyn PageLister, config: &'a UpdaterConfig) -> Self {
        Self { lister, config }
    }

    /// Query the listing. With `skip` set no request is made and the
    /// returned state reports that nothing was checked.
    #[tracing::instrument(skip(self))]
    pub async fn probe(&self, skip: bool) -> Result<RemoteState> {
        if skip {
            debug!("Remote version check skipped");
            return Ok(RemoteState::skipped());
        }

        let url = self.config.listing_url();
        info!("Checking published versions at {}", url);
        let entries = self
            .lister
            .list_entries(&url)
            .await
            .with_context(|| format!("Failed to read the version listing at {}", url))?;

        // A label that does not parse means the page layout changed.
        let versions = entries
            .iter()
            .map(|entry| {
                let label = entry.trim().trim_end_matches('/');
                Version::parse(label)
                    .with_context(|| format!("Unexpected entry {:?} on {}", entry, url))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RemoteState::checked(versions))
    }
}
