//! One full run: crawl the listing, then collect every candidate.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::TrackerApi;
use crate::collector::{collect, CollectError, CollectSummary};
use crate::crawl::{collect_candidate_ids, CrawlError, CrawlOptions};
use crate::sink::RecordSink;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Collect(#[from] CollectError),
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub candidates: Vec<u64>,
    pub collected: CollectSummary,
}

/// Crawl then collect, sharing one request delay.
pub async fn run(
    api: &dyn TrackerApi,
    sink: &dyn RecordSink,
    options: &CrawlOptions,
) -> Result<RunSummary, RunError> {
    let candidates = collect_candidate_ids(api, options).await?;

    if candidates.is_empty() {
        info!(console = %options.console, "No matching torrents found");
    }

    let collected = collect(api, &candidates, sink, options.request_delay).await?;

    Ok(RunSummary {
        candidates,
        collected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::region::RegionFilter;
    use crate::testing::{fixtures, MemorySink, MockTrackerApi};
    use std::time::Duration;

    fn options() -> CrawlOptions {
        CrawlOptions::new("PlayStation").with_request_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_empty_listing_writes_nothing() {
        let api = MockTrackerApi::new();
        let sink = MemorySink::new();

        let summary = run(&api, &sink, &options()).await.unwrap();

        assert!(summary.candidates.is_empty());
        assert!(sink.records().is_empty());
        assert!(api.requested_details().is_empty());
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_only_filtered_candidates_are_fetched() {
        let api = MockTrackerApi::new();
        api.push_page(fixtures::search_page(vec![vec![
            fixtures::summary(1, "Japan", "Redump"),
            fixtures::summary(2, "USA", "Redump"),
        ]]));
        api.set_detail(2, fixtures::detail_envelope(20, 2, "", &["x.iso"]));
        let sink = MemorySink::new();

        let summary = run(&api, &sink, &options().with_region(RegionFilter::Usa))
            .await
            .unwrap();

        assert_eq!(summary.candidates, vec![2]);
        assert_eq!(api.requested_details(), vec![2]);
        assert_eq!(summary.collected.records_written, 1);
    }

    #[tokio::test]
    async fn test_crawl_failure_skips_collection() {
        let api = MockTrackerApi::new();
        api.fail_page(1, ApiError::Timeout);
        let sink = MemorySink::new();

        let err = run(&api, &sink, &options()).await.unwrap_err();

        assert!(matches!(err, RunError::Crawl(_)));
        assert_eq!(sink.flush_count(), 0);
    }
}
