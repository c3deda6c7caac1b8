//! Tracker API access.
//!
//! The crawl and collect stages only see the `TrackerApi` trait; the
//! reqwest-backed `GazelleClient` is the production implementation and
//! `testing::MockTrackerApi` stands in for it in tests.

mod client;
mod de;
mod types;

pub use client::GazelleClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the tracker.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Could not reach the tracker.
    #[error("Tracker connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timeout")]
    Timeout,

    /// Any other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Body was not the JSON shape we expect.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl ApiError {
    /// Malformed payloads can be skipped per item; transport failures cannot.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ApiError::Parse(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Http(e.to_string())
        }
    }
}

/// The two tracker endpoints the crawler consumes.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch one page of torrent search results for a console.
    ///
    /// Pages are 1-based. An exhausted listing comes back as an empty page,
    /// not an error.
    async fn search_page(&self, console: &str, page: u32) -> Result<SearchPage, ApiError>;

    /// Fetch the full record for one torrent.
    ///
    /// Returns `ApiError::Parse` when the body is not JSON; a JSON body with
    /// a non-success status is returned as-is for the caller to judge.
    async fn torrent_detail(&self, torrent_id: u64) -> Result<DetailEnvelope, ApiError>;
}
