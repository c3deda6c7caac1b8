//! Search-page crawl: page through a console's listing and collect the ids
//! of special-edition torrents.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::{ApiError, SearchPage, TorrentSummary, TrackerApi};
use crate::config::CrawlConfig;
use crate::region::RegionFilter;

/// Errors that abort a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Search page {page} failed: {source}")]
    Api {
        page: u32,
        #[source]
        source: ApiError,
    },
}

/// Run-scoped crawl parameters.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Console name as listed by the tracker.
    pub console: String,
    pub region: RegionFilter,
    /// Cap on collected ids; `None` crawls until the listing runs out.
    pub limit: Option<usize>,
    /// Pause between consecutive requests.
    pub request_delay: Duration,
    /// Lowercase remaster-title markers.
    pub special_editions: Vec<String>,
}

impl CrawlOptions {
    pub fn new(console: impl Into<String>) -> Self {
        Self::from_config(&CrawlConfig {
            console: console.into(),
            ..CrawlConfig::default()
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            console: config.console.clone(),
            region: config.region_filter(),
            limit: config.limit,
            request_delay: config.request_delay(),
            special_editions: config
                .special_editions
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn with_region(mut self, region: RegionFilter) -> Self {
        self.region = region;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Whether a remaster title carries one of the special-edition markers.
    pub fn is_special_edition(&self, remaster_title: &str) -> bool {
        if remaster_title.is_empty() {
            return false;
        }
        let title = remaster_title.to_lowercase();
        self.special_editions
            .iter()
            .any(|marker| title.contains(marker.as_str()))
    }

    /// Whether a listed torrent should be fetched in full.
    pub fn accepts(&self, torrent: &TorrentSummary) -> bool {
        self.is_special_edition(&torrent.remaster_title) && self.region.accepts(&torrent.region)
    }
}

/// Candidate ids on one page, in listing order.
pub fn select_candidates(page: &SearchPage, options: &CrawlOptions) -> Vec<u64> {
    page.torrents()
        .filter(|t| options.accepts(t))
        .map(|t| t.id)
        .collect()
}

/// Page through search results from page 1 and collect candidate ids.
///
/// Stops at the first empty page or once `limit` ids are collected, in
/// which case the result is truncated to exactly `limit`. A failed page
/// fetch aborts the crawl. Ids are returned in discovery order without
/// deduplication.
pub async fn collect_candidate_ids(
    api: &dyn TrackerApi,
    options: &CrawlOptions,
) -> Result<Vec<u64>, CrawlError> {
    let mut candidates: Vec<u64> = Vec::new();
    let mut page: u32 = 1;

    info!(
        console = %options.console,
        region = %options.region,
        limit = ?options.limit,
        backend = api.name(),
        "Starting crawl"
    );

    loop {
        let results = api
            .search_page(&options.console, page)
            .await
            .map_err(|source| CrawlError::Api { page, source })?;

        if results.is_empty() {
            debug!(page = page, "Empty search page, listing exhausted");
            break;
        }

        let new_ids = select_candidates(&results, options);
        info!("Number of torrents to fetch on this page: {}", new_ids.len());
        candidates.extend(new_ids);

        info!("Fetched page {}, total so far: {}", page, candidates.len());

        if let Some(limit) = options.limit {
            if candidates.len() >= limit {
                candidates.truncate(limit);
                info!("Reached limit of {} torrents, stopping early", limit);
                break;
            }
        }

        page += 1;
        sleep(options.request_delay).await;
    }

    info!("Total torrents collected: {}", candidates.len());
    Ok(candidates)
}
