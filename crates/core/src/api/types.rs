//! Wire types for the tracker API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::de;
use super::ApiError;

/// Status value the tracker uses for a good response.
pub const STATUS_SUCCESS: &str = "success";

/// A torrent as listed on a search page. Only used for filtering.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TorrentSummary {
    #[serde(rename = "ID", deserialize_with = "de::id")]
    pub id: u64,
    #[serde(rename = "Region", default, deserialize_with = "de::string")]
    pub region: String,
    #[serde(rename = "RemasterTitle", default, deserialize_with = "de::string")]
    pub remaster_title: String,
}

/// A release group on a search page with its listed torrents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGroup {
    /// Key the group was listed under.
    pub key: String,
    /// Torrents in listing order.
    pub torrents: Vec<TorrentSummary>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Upstream status field, if any.
    pub status: Option<String>,
    /// Groups in listing order. Empty when the listing is exhausted.
    pub groups: Vec<SearchGroup>,
}

impl SearchPage {
    /// Parse a raw search response body.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::Parse(format!("search response is not JSON: {}", e)))?;
        Ok(Self::from_value(&value))
    }

    /// Build a page from a parsed search response.
    ///
    /// `response` may be an object of groups, an empty array, `null` or
    /// missing; everything but a non-empty object is an empty page. Torrent
    /// entries without a usable id are dropped.
    pub fn from_value(value: &Value) -> Self {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string);

        let groups = match value.get("response") {
            Some(Value::Object(groups)) => groups
                .iter()
                .map(|(key, group)| SearchGroup {
                    key: key.clone(),
                    torrents: parse_summaries(key, group.get("Torrents")),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self { status, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All torrents on the page in listing order.
    pub fn torrents(&self) -> impl Iterator<Item = &TorrentSummary> {
        self.groups.iter().flat_map(|g| g.torrents.iter())
    }
}

fn parse_summaries(group_key: &str, torrents: Option<&Value>) -> Vec<TorrentSummary> {
    let entries: Vec<&Value> = match torrents {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(list)) => list.iter().collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| match TorrentSummary::deserialize(entry) {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!(group = group_key, error = %e, "Dropping unreadable torrent entry");
                None
            }
        })
        .collect()
}

/// A release group (e.g., one game title).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Group {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub year: Option<i64>,
}

/// A file inside a torrent. Position in the list is significant.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileEntry {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
}

/// Full torrent record from the detail endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TorrentDetail {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub group_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub info_hash: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub remaster_year: Option<i64>,
    #[serde(default, deserialize_with = "de::string")]
    pub remaster_title: String,
    #[serde(default, deserialize_with = "de::string")]
    pub release_title: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub release_type: Option<String>,
    /// HTML-formatted description.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub description: Option<String>,
    /// BBCode description, used when the HTML one is empty.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub bb_description: Option<String>,
    #[serde(default, deserialize_with = "de::list")]
    pub file_list: Vec<FileEntry>,
}

impl TorrentDetail {
    /// The description to mine for a disc id: HTML first, BBCode second.
    pub fn description_text(&self) -> Option<&str> {
        [&self.description, &self.bb_description]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .find(|d| !d.is_empty())
    }
}

/// The `response` object of a successful detail call.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TorrentResponse {
    pub group: Group,
    pub torrent: TorrentDetail,
}

/// Raw detail-endpoint body: `{status, response}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetailEnvelope {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub response: Value,
    /// Error text the tracker sends alongside a failure status.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub error: Option<String>,
}

impl DetailEnvelope {
    /// Parse a raw detail response body.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::Parse(format!("detail response is not JSON: {}", e)))
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// Extract the group and torrent objects.
    pub fn into_response(self) -> Result<TorrentResponse, ApiError> {
        TorrentResponse::deserialize(self.response)
            .map_err(|e| ApiError::Parse(format!("unexpected detail payload: {}", e)))
    }
}
