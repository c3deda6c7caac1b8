//! GazelleGames API client.
//!
//! Every call is a GET against a single `api.php` endpoint, selected by the
//! `request` query parameter and authenticated with an `X-API-Key` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{ApiError, DetailEnvelope, SearchPage, TrackerApi, STATUS_SUCCESS};
use crate::config::ApiConfig;

const API_KEY_HEADER: &str = "X-API-Key";

/// reqwest-backed tracker client.
pub struct GazelleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GazelleClient {
    /// Create a new client. The key comes from the credential loader.
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::NotConfigured("API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    async fn get(&self, query: &[(&str, String)]) -> Result<String, ApiError> {
        debug!(url = %self.base_url, query = ?query, "Tracker request");

        let response = self
            .client
            .get(&self.base_url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The tracker reports most failures in the JSON body, so the
            // body is still handed to the caller.
            debug!(status = %status, "Tracker returned non-2xx status");
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TrackerApi for GazelleClient {
    fn name(&self) -> &str {
        "gazellegames"
    }

    async fn search_page(&self, console: &str, page: u32) -> Result<SearchPage, ApiError> {
        let body = self
            .get(&[
                ("request", "search".to_string()),
                ("search_type", "torrents".to_string()),
                ("page", page.to_string()),
                ("artistname", console.to_string()),
            ])
            .await?;

        let page_data = SearchPage::from_body(&body)?;

        if let Some(status) = page_data.status.as_deref() {
            if status != STATUS_SUCCESS {
                warn!(page = page, status = status, "Search returned non-success status");
            }
        }

        Ok(page_data)
    }

    async fn torrent_detail(&self, torrent_id: u64) -> Result<DetailEnvelope, ApiError> {
        let body = self
            .get(&[
                ("request", "torrent".to_string()),
                ("id", torrent_id.to_string()),
            ])
            .await?;

        DetailEnvelope::from_body(&body)
    }
}
