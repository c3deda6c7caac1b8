//! One row per (torrent, file).

use serde::{Deserialize, Serialize};

use crate::api::{Group, TorrentDetail};
use crate::extract::{decode_entities, extract_disc_id};

/// Column order of the flat-file output.
pub const CSV_HEADER: [&str; 14] = [
    "group_id",
    "group_name",
    "group_year",
    "torrent_id",
    "info_hash",
    "region",
    "language",
    "remaster_year",
    "remaster_title",
    "release_title",
    "release_type",
    "file_index",
    "file_name",
    "redump_nr",
];

/// The flattened unit handed to a sink.
///
/// Field order matches [`CSV_HEADER`]; the CSV sink serializes it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub group_id: u64,
    pub group_name: String,
    pub group_year: Option<i64>,
    pub torrent_id: u64,
    pub info_hash: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub remaster_year: Option<i64>,
    pub remaster_title: String,
    pub release_title: String,
    pub release_type: Option<String>,
    /// 1-based position in the torrent's file list.
    pub file_index: Option<u32>,
    pub file_name: Option<String>,
    pub redump_nr: Option<u64>,
}

/// Turn a group and one of its torrents into output rows.
///
/// Yields one record per file in file-list order, or a single record with
/// no file fields when the list is empty. Text fields are entity-decoded and
/// the disc id is computed once and shared by every row.
pub fn normalize(group: &Group, torrent: &TorrentDetail) -> Vec<NormalizedRecord> {
    let base = NormalizedRecord {
        group_id: group.id,
        group_name: decode_entities(&group.name),
        group_year: group.year,
        torrent_id: torrent.id,
        info_hash: torrent.info_hash.clone(),
        region: torrent.region.clone(),
        language: torrent.language.clone(),
        remaster_year: torrent.remaster_year,
        remaster_title: decode_entities(&torrent.remaster_title),
        release_title: decode_entities(&torrent.release_title),
        release_type: torrent.release_type.clone(),
        file_index: None,
        file_name: None,
        redump_nr: extract_disc_id(torrent.description_text()),
    };

    if torrent.file_list.is_empty() {
        return vec![base];
    }

    torrent
        .file_list
        .iter()
        .zip(1u32..)
        .map(|(file, index)| NormalizedRecord {
            file_index: Some(index),
            file_name: Some(decode_entities(&file.name)),
            ..base.clone()
        })
        .collect()
}
