//! SQLite-backed sink.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{batch_torrent_id, RecordSink, SinkError};
use crate::normalize::NormalizedRecord;

/// Stores one `torrents` row per torrent and one `torrent_files` row per file.
///
/// Each write replaces everything previously stored for that torrent id in
/// a single transaction.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

/// A `torrents` row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTorrent {
    pub torrent_id: u64,
    pub group_id: u64,
    pub group_name: String,
    pub group_year: Option<i64>,
    pub info_hash: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub remaster_year: Option<i64>,
    pub remaster_title: String,
    pub release_title: String,
    pub release_type: Option<String>,
    pub redump_id: Option<u64>,
}

/// A `torrent_files` row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_index: u32,
    pub file_name: Option<String>,
}

impl SqliteSink {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SinkError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per torrent, disc id pulled from the description
            CREATE TABLE IF NOT EXISTS torrents (
                torrent_id     INTEGER PRIMARY KEY,
                group_id       INTEGER,
                group_name     TEXT,
                group_year     INTEGER,
                info_hash      TEXT,
                region         TEXT,
                language       TEXT,
                remaster_year  INTEGER,
                remaster_title TEXT,
                release_title  TEXT,
                release_type   TEXT,
                redump_id      INTEGER
            );

            -- Files per torrent, 1-based index in file-list order
            CREATE TABLE IF NOT EXISTS torrent_files (
                torrent_id  INTEGER NOT NULL REFERENCES torrents(torrent_id),
                file_index  INTEGER NOT NULL,
                file_name   TEXT,
                PRIMARY KEY (torrent_id, file_index)
            );
            "#,
        )?;

        Ok(())
    }

    /// Number of stored torrents.
    pub fn torrent_count(&self) -> Result<u64, SinkError> {
        let conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM torrents", [], |row| row.get(0))?;
        count_from_sql(count)
    }

    /// Number of stored file rows across all torrents.
    pub fn file_count(&self) -> Result<u64, SinkError> {
        let conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM torrent_files", [], |row| row.get(0))?;
        count_from_sql(count)
    }

    /// Get a stored torrent row.
    pub fn get_torrent(&self, torrent_id: u64) -> Result<Option<StoredTorrent>, SinkError> {
        let torrent_id = id_to_sql(torrent_id)?;
        let conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        let torrent = conn
            .query_row(
                "SELECT torrent_id, group_id, group_name, group_year, info_hash, region,
                        language, remaster_year, remaster_title, release_title,
                        release_type, redump_id
                 FROM torrents WHERE torrent_id = ?",
                params![torrent_id],
                |row| {
                    Ok(StoredTorrent {
                        torrent_id: id_from_row(row, 0)?,
                        group_id: id_from_row(row, 1)?,
                        group_name: row.get(2)?,
                        group_year: row.get(3)?,
                        info_hash: row.get(4)?,
                        region: row.get(5)?,
                        language: row.get(6)?,
                        remaster_year: row.get(7)?,
                        remaster_title: row.get(8)?,
                        release_title: row.get(9)?,
                        release_type: row.get(10)?,
                        redump_id: opt_id_from_row(row, 11)?,
                    })
                },
            )
            .optional()?;
        Ok(torrent)
    }

    /// Stored files for a torrent, ordered by index.
    pub fn file_rows(&self, torrent_id: u64) -> Result<Vec<StoredFile>, SinkError> {
        let torrent_id = id_to_sql(torrent_id)?;
        let conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT file_index, file_name FROM torrent_files
             WHERE torrent_id = ? ORDER BY file_index",
        )?;

        let rows = stmt.query_map(params![torrent_id], |row| {
            Ok(StoredFile {
                file_index: row.get(0)?,
                file_name: row.get(1)?,
            })
        })?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }
}

/// SQLite integers are signed 64-bit; larger ids are rejected.
fn id_to_sql(id: u64) -> Result<i64, SinkError> {
    i64::try_from(id)
        .map_err(|_| SinkError::Database(format!("id {} exceeds SQLite integer range", id)))
}

fn id_from_row(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

fn opt_id_from_row(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<u64>> {
    let value: Option<i64> = row.get(idx)?;
    value
        .map(|v| u64::try_from(v).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, v)))
        .transpose()
}

fn count_from_sql(count: i64) -> Result<u64, SinkError> {
    u64::try_from(count).map_err(|_| SinkError::Database(format!("negative row count {}", count)))
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write(&self, records: &[NormalizedRecord]) -> Result<usize, SinkError> {
        let torrent_id = id_to_sql(batch_torrent_id(records)?)?;
        let head = &records[0];
        let group_id = id_to_sql(head.group_id)?;
        let redump_id = head.redump_nr.map(id_to_sql).transpose()?;

        let mut conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO torrents (
                torrent_id, group_id, group_name, group_year,
                info_hash, region, language,
                remaster_year, remaster_title,
                release_title, release_type, redump_id
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(torrent_id) DO UPDATE SET
                group_id = excluded.group_id,
                group_name = excluded.group_name,
                group_year = excluded.group_year,
                info_hash = excluded.info_hash,
                region = excluded.region,
                language = excluded.language,
                remaster_year = excluded.remaster_year,
                remaster_title = excluded.remaster_title,
                release_title = excluded.release_title,
                release_type = excluded.release_type,
                redump_id = excluded.redump_id",
            params![
                torrent_id,
                group_id,
                &head.group_name,
                head.group_year,
                &head.info_hash,
                &head.region,
                &head.language,
                head.remaster_year,
                &head.remaster_title,
                &head.release_title,
                &head.release_type,
                redump_id,
            ],
        )?;

        // Drop rows left over from a previous file count.
        tx.execute(
            "DELETE FROM torrent_files WHERE torrent_id = ?",
            params![torrent_id],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO torrent_files (torrent_id, file_index, file_name) VALUES (?, ?, ?)",
            )?;
            for record in records {
                if let Some(file_index) = record.file_index {
                    insert.execute(params![torrent_id, file_index, &record.file_name])?;
                }
            }
        }

        tx.commit()?;
        Ok(records.len())
    }
}
