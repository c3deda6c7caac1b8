//! Mock tracker API for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{ApiError, DetailEnvelope, SearchPage, TrackerApi};

/// Mock implementation of the TrackerApi trait.
///
/// Provides controllable behavior for testing:
/// - Scripted search pages (page N is the Nth pushed page, empty afterwards)
/// - Per-id detail responses, raw JSON included
/// - Injected failures for a page or an id
/// - Recorded requests for assertions
///
/// # Example
///
/// ```rust,ignore
/// use ggn_redump_core::testing::{MockTrackerApi, fixtures};
///
/// let api = MockTrackerApi::new();
/// api.push_page(fixtures::search_page(vec![vec![fixtures::summary(1, "USA", "Redump")]]));
/// api.set_detail(1, fixtures::detail_envelope(10, 1, "redump.org/disc/5", &["a.iso"]));
///
/// let ids = collect_candidate_ids(&api, &options).await?;
/// assert_eq!(api.requested_pages(), vec![1, 2]);
/// ```
#[derive(Default)]
pub struct MockTrackerApi {
    pages: Mutex<Vec<SearchPage>>,
    page_errors: Mutex<HashMap<u32, ApiError>>,
    details: Mutex<HashMap<u64, DetailEnvelope>>,
    detail_errors: Mutex<HashMap<u64, ApiError>>,
    searches: Mutex<Vec<(String, u32)>>,
    detail_requests: Mutex<Vec<u64>>,
}

impl std::fmt::Debug for MockTrackerApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTrackerApi")
            .field("pages", &"<pages>")
            .field("details", &"<details>")
            .finish()
    }
}

impl MockTrackerApi {
    /// Create a mock with no pages and no details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next search page.
    pub fn push_page(&self, page: SearchPage) {
        self.pages.lock().unwrap().push(page);
    }

    /// Make a page request fail once.
    pub fn fail_page(&self, page: u32, error: ApiError) {
        self.page_errors.lock().unwrap().insert(page, error);
    }

    /// Set the detail response for an id.
    pub fn set_detail(&self, torrent_id: u64, envelope: DetailEnvelope) {
        self.details.lock().unwrap().insert(torrent_id, envelope);
    }

    /// Set the detail response for an id from raw JSON.
    pub fn set_detail_json(&self, torrent_id: u64, body: Value) {
        let envelope: DetailEnvelope =
            serde_json::from_value(body).expect("detail JSON must be an object");
        self.set_detail(torrent_id, envelope);
    }

    /// Make a detail request fail once.
    pub fn fail_detail(&self, torrent_id: u64, error: ApiError) {
        self.detail_errors.lock().unwrap().insert(torrent_id, error);
    }

    /// Console and page of every search request, in order.
    pub fn recorded_searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().unwrap().clone()
    }

    /// Page numbers requested, in order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.recorded_searches().into_iter().map(|(_, p)| p).collect()
    }

    /// Torrent ids whose details were requested, in order.
    pub fn requested_details(&self) -> Vec<u64> {
        self.detail_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackerApi for MockTrackerApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_page(&self, console: &str, page: u32) -> Result<SearchPage, ApiError> {
        self.searches
            .lock()
            .unwrap()
            .push((console.to_string(), page));

        if let Some(err) = self.page_errors.lock().unwrap().remove(&page) {
            return Err(err);
        }

        let pages = self.pages.lock().unwrap();
        Ok(page
            .checked_sub(1)
            .and_then(|i| pages.get(i as usize))
            .cloned()
            .unwrap_or_default())
    }

    async fn torrent_detail(&self, torrent_id: u64) -> Result<DetailEnvelope, ApiError> {
        self.detail_requests.lock().unwrap().push(torrent_id);

        if let Some(err) = self.detail_errors.lock().unwrap().remove(&torrent_id) {
            return Err(err);
        }

        // Unknown ids get what the tracker sends for a bad id.
        Ok(self
            .details
            .lock()
            .unwrap()
            .get(&torrent_id)
            .cloned()
            .unwrap_or_else(|| DetailEnvelope {
                status: Some("failure".to_string()),
                response: Value::Null,
                error: Some("bad id parameter".to_string()),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_pages_served_in_order_then_empty() {
        let api = MockTrackerApi::new();
        api.push_page(fixtures::search_page(vec![vec![fixtures::summary(1, "USA", "Redump")]]));

        let first = api.search_page("Saturn", 1).await.unwrap();
        assert_eq!(first.torrents().count(), 1);
        assert!(api.search_page("Saturn", 2).await.unwrap().is_empty());
        assert!(api.search_page("Saturn", 0).await.unwrap().is_empty());
        assert_eq!(api.requested_pages(), vec![1, 2, 0]);
    }

    #[tokio::test]
    async fn test_injected_error_fires_once() {
        let api = MockTrackerApi::new();
        api.fail_detail(5, ApiError::Timeout);

        assert!(api.torrent_detail(5).await.is_err());
        let envelope = api.torrent_detail(5).await.unwrap();
        assert!(!envelope.is_success());
        assert_eq!(api.requested_details(), vec![5, 5]);
    }
}
