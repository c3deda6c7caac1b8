//! Testing utilities and mock implementations.
//!
//! Provides an in-process tracker and sink so crawl and collection can be
//! exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use ggn_redump_core::testing::{fixtures, MemorySink, MockTrackerApi};
//!
//! let api = MockTrackerApi::new();
//! api.set_detail(1, fixtures::detail_envelope(10, 1, "redump.org/disc/5", &["a.iso"]));
//!
//! let sink = MemorySink::new();
//! collect(&api, &[1], &sink, Duration::ZERO).await?;
//! assert_eq!(sink.records()[0].redump_nr, Some(5));
//! ```

mod memory_sink;
mod mock_tracker;

pub use memory_sink::MemorySink;
pub use mock_tracker::MockTrackerApi;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::api::{DetailEnvelope, SearchGroup, SearchPage, TorrentSummary, STATUS_SUCCESS};

    /// A listed torrent.
    pub fn summary(id: u64, region: &str, remaster_title: &str) -> TorrentSummary {
        TorrentSummary {
            id,
            region: region.to_string(),
            remaster_title: remaster_title.to_string(),
        }
    }

    /// A successful search page, one group per inner vector keyed "1".."n".
    pub fn search_page(groups: Vec<Vec<TorrentSummary>>) -> SearchPage {
        SearchPage {
            status: Some(STATUS_SUCCESS.to_string()),
            groups: groups
                .into_iter()
                .enumerate()
                .map(|(i, torrents)| SearchGroup {
                    key: (i + 1).to_string(),
                    torrents,
                })
                .collect(),
        }
    }

    /// Raw body of a successful detail call for a USA "Redump" torrent.
    pub fn detail_json(group_id: u64, torrent_id: u64, description: &str, files: &[&str]) -> Value {
        let file_list: Vec<Value> = files.iter().map(|name| json!({ "name": name })).collect();
        json!({
            "status": "success",
            "response": {
                "group": {
                    "id": group_id,
                    "name": format!("Group {}", group_id),
                    "year": 1998
                },
                "torrent": {
                    "id": torrent_id,
                    "groupId": group_id,
                    "infoHash": format!("{:040X}", torrent_id),
                    "region": "USA",
                    "language": "English",
                    "remasterYear": 1998,
                    "remasterTitle": "Redump",
                    "releaseTitle": format!("Release {}", torrent_id),
                    "releaseType": "GameDOX",
                    "description": description,
                    "fileList": file_list
                }
            }
        })
    }

    /// Parsed form of [`detail_json`].
    pub fn detail_envelope(
        group_id: u64,
        torrent_id: u64,
        description: &str,
        files: &[&str],
    ) -> DetailEnvelope {
        serde_json::from_value(detail_json(group_id, torrent_id, description, files))
            .expect("fixture JSON is a valid envelope")
    }
}
