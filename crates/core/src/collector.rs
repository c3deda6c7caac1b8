//! Detail collection: fetch each candidate torrent, normalize it and hand
//! the rows to a sink.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::api::{ApiError, TrackerApi};
use crate::normalize::normalize;
use crate::sink::{RecordSink, SinkError};

/// Errors that abort collection. Malformed responses are skipped instead.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Fetching torrent {torrent_id} failed: {source}")]
    Api {
        torrent_id: u64,
        #[source]
        source: ApiError,
    },

    #[error("Writing torrent {torrent_id} to {sink} failed: {source}")]
    Sink {
        torrent_id: u64,
        sink: String,
        #[source]
        source: SinkError,
    },

    #[error("Flushing {sink} failed: {source}")]
    Flush {
        sink: String,
        #[source]
        source: SinkError,
    },
}

/// Outcome of a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    /// Records handed to the sink.
    pub records_written: usize,
    /// Torrents that produced records.
    pub torrents_written: usize,
    /// Ids skipped because of a malformed or non-success response.
    pub skipped: Vec<u64>,
}

/// Fetch, normalize and store every candidate in order.
///
/// A body that is not JSON, a status other than `"success"`, or a payload
/// without the expected group and torrent objects is logged and skipped.
/// Transport and sink failures abort. The request delay is applied after
/// every detail fetch.
pub async fn collect(
    api: &dyn TrackerApi,
    candidate_ids: &[u64],
    sink: &dyn RecordSink,
    request_delay: Duration,
) -> Result<CollectSummary, CollectError> {
    let mut summary = CollectSummary::default();
    let total = candidate_ids.len();

    for (index, &torrent_id) in candidate_ids.iter().enumerate() {
        info!(
            "Fetching torrent metadata {}/{} (ID: {})",
            index + 1,
            total,
            torrent_id
        );

        let fetched = api.torrent_detail(torrent_id).await;
        let written = match fetched {
            Ok(envelope) if !envelope.is_success() => {
                warn!(
                    torrent_id = torrent_id,
                    status = envelope.status.as_deref().unwrap_or("<missing>"),
                    error = envelope.error.as_deref().unwrap_or(""),
                    "Skipping torrent, bad response"
                );
                None
            }
            Ok(envelope) => match envelope.into_response() {
                Ok(response) => {
                    let records = normalize(&response.group, &response.torrent);
                    let count = sink.write(&records).map_err(|source| CollectError::Sink {
                        torrent_id,
                        sink: sink.name().to_string(),
                        source,
                    })?;
                    Some(count)
                }
                Err(e) => {
                    warn!(
                        torrent_id = torrent_id,
                        error = %e,
                        "Skipping torrent, unexpected payload"
                    );
                    None
                }
            },
            Err(e) if e.is_skippable() => {
                warn!(torrent_id = torrent_id, error = %e, "Error decoding JSON for torrent");
                None
            }
            Err(source) => return Err(CollectError::Api { torrent_id, source }),
        };

        match written {
            Some(count) => {
                summary.records_written += count;
                summary.torrents_written += 1;
            }
            None => summary.skipped.push(torrent_id),
        }

        sleep(request_delay).await;
    }

    sink.flush().map_err(|source| CollectError::Flush {
        sink: sink.name().to_string(),
        source,
    })?;

    info!(
        records = summary.records_written,
        torrents = summary.torrents_written,
        skipped = summary.skipped.len(),
        "Metadata collection complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemorySink, MockTrackerApi};
    use serde_json::json;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_writes_records_in_candidate_order() {
        let api = MockTrackerApi::new();
        api.set_detail(2, fixtures::detail_envelope(20, 2, "redump.org/disc/2", &["b.iso"]));
        api.set_detail(
            1,
            fixtures::detail_envelope(10, 1, "redump.org/disc/1", &["a.bin", "a.cue"]),
        );
        let sink = MemorySink::new();

        let summary = collect(&api, &[2, 1], &sink, Duration::ZERO).await.unwrap();

        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.torrents_written, 2);
        assert!(summary.skipped.is_empty());
        assert_eq!(api.requested_details(), vec![2, 1]);

        let batches = sink.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].torrent_id, 2);
        assert_eq!(batches[1].len(), 2);
        assert_eq!(batches[1][1].file_index, Some(2));
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_skips_non_success_status() {
        let api = MockTrackerApi::new();
        api.set_detail_json(1, json!({"status": "failure", "error": "bad id parameter"}));
        api.set_detail(2, fixtures::detail_envelope(20, 2, "", &[]));
        let sink = MemorySink::new();

        let summary = collect(&api, &[1, 2], &sink, Duration::ZERO).await.unwrap();

        assert_eq!(summary.skipped, vec![1]);
        assert_eq!(summary.records_written, 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_unparseable_body() {
        let api = MockTrackerApi::new();
        api.fail_detail(1, ApiError::Parse("expected value at line 1".to_string()));
        api.set_detail(2, fixtures::detail_envelope(20, 2, "", &["x.iso"]));
        let sink = MemorySink::new();

        let summary = collect(&api, &[1, 2], &sink, Duration::ZERO).await.unwrap();

        assert_eq!(summary.skipped, vec![1]);
        assert_eq!(summary.torrents_written, 1);
        assert_eq!(api.requested_details(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_skips_success_without_payload() {
        let api = MockTrackerApi::new();
        api.set_detail_json(1, json!({"status": "success", "response": {"group": {"id": 1}}}));
        let sink = MemorySink::new();

        let summary = collect(&api, &[1], &sink, Duration::ZERO).await.unwrap();

        assert_eq!(summary.skipped, vec![1]);
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let api = MockTrackerApi::new();
        api.set_detail(1, fixtures::detail_envelope(10, 1, "", &[]));
        api.fail_detail(2, ApiError::Timeout);
        api.set_detail(3, fixtures::detail_envelope(30, 3, "", &[]));
        let sink = MemorySink::new();

        let err = collect(&api, &[1, 2, 3], &sink, Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CollectError::Api {
                torrent_id: 2,
                source: ApiError::Timeout
            }
        ));
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(api.requested_details(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_sink_failure_aborts() {
        let api = MockTrackerApi::new();
        api.set_detail(1, fixtures::detail_envelope(10, 1, "", &[]));
        let sink = MemorySink::new();
        sink.fail_next_write(SinkError::Database("disk I/O error".to_string()));

        let err = collect(&api, &[1], &sink, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, CollectError::Sink { torrent_id: 1, .. }));
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let api = MockTrackerApi::new();
        let sink = MemorySink::new();

        let summary = collect(&api, &[], &sink, Duration::ZERO).await.unwrap();
        assert_eq!(summary, CollectSummary::default());
        assert!(api.requested_details().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_every_fetch() {
        let delay = Duration::from_millis(2100);
        let api = MockTrackerApi::new();
        api.set_detail(1, fixtures::detail_envelope(10, 1, "", &["a.iso"]));
        api.set_detail_json(2, json!({"status": "failure"}));
        api.fail_detail(3, ApiError::Parse("not JSON".to_string()));
        let sink = MemorySink::new();

        let started = Instant::now();
        let summary = collect(&api, &[1, 2, 3], &sink, delay).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(summary.skipped, vec![2, 3]);
        assert!(elapsed >= delay * 3, "waited {:?}", elapsed);
        assert!(elapsed < delay * 4, "waited {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_skips_remaining_pauses() {
        let delay = Duration::from_millis(2100);
        let api = MockTrackerApi::new();
        api.set_detail(1, fixtures::detail_envelope(10, 1, "", &[]));
        api.fail_detail(2, ApiError::Timeout);
        let sink = MemorySink::new();

        let started = Instant::now();
        collect(&api, &[1, 2, 3], &sink, delay).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(elapsed >= delay, "waited {:?}", elapsed);
        assert!(elapsed < delay * 2, "waited {:?}", elapsed);
    }
}
