//! Vendor listing page access.
//!
//! The stable listing is a plain directory index: a table whose rows link
//! to one folder per published version (`7.5.7/`, `7.6.1/`, ...).

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use scraper::{Html, Selector};

use crate::http::HttpClient;

/// Source of directory-listing entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageLister: Send + Sync {
    /// Link labels of the listing rows, in page order, excluding header,
    /// footer and parent-directory rows.
    async fn list_entries(&self, url: &str) -> Result<Vec<String>>;
}

/// Lists entries by fetching and parsing the HTML index page.
pub struct HtmlPageLister {
    http_client: HttpClient,
}

impl HtmlPageLister {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl PageLister for HtmlPageLister {
    #[tracing::instrument(skip(self))]
    async fn list_entries(&self, url: &str) -> Result<Vec<String>> {
        let body = self.http_client.get_text(url).await?;
        let entries = parse_listing(&body)?;
        debug!("Found {} entries on {}", entries.len(), url);
        Ok(entries)
    }
}

/// Extract entry labels from a directory index page.
pub fn parse_listing(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").map_err(|e| anyhow!(e.to_string()))?;
    let row_selector = Selector::parse("tr").map_err(|e| anyhow!(e.to_string()))?;
    let link_selector = Selector::parse("td a").map_err(|e| anyhow!(e.to_string()))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| anyhow!("Listing page has no table"))?;

    let mut entries = Vec::new();
    for row in table.select(&row_selector) {
        // Header rows use <th> and carry no data link.
        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        let label = link.text().collect::<String>().trim().to_string();

        if label.is_empty() || is_navigation_link(href, &label) {
            continue;
        }
        entries.push(label);
    }

    Ok(entries)
}

fn is_navigation_link(href: &str, label: &str) -> bool {
    label.eq_ignore_ascii_case("Parent Directory")
        || href.starts_with('?')
        || href.starts_with('/')
        || href.starts_with("..")
}
