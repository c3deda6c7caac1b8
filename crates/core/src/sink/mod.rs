//! Output sinks for normalized records.
//!
//! The collector hands each torrent's rows to a `RecordSink` in one call;
//! which sink is used is the caller's choice.

mod flat_file;
mod sqlite;

pub use flat_file::CsvSink;
pub use sqlite::{SqliteSink, StoredFile, StoredTorrent};

use thiserror::Error;

use crate::normalize::NormalizedRecord;

/// Errors that can occur while writing records.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid record batch: {0}")]
    InvalidBatch(String),

    #[error("Sink lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for SinkError {
    fn from(e: rusqlite::Error) -> Self {
        SinkError::Database(e.to_string())
    }
}

impl From<csv::Error> for SinkError {
    fn from(e: csv::Error) -> Self {
        SinkError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e.to_string())
    }
}

/// Destination for normalized records.
pub trait RecordSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Write every record produced for one torrent.
    ///
    /// All records in a batch share a torrent id. Returns the number of
    /// records accepted.
    fn write(&self, records: &[NormalizedRecord]) -> Result<usize, SinkError>;

    /// Push buffered output to its destination.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Check that a batch is non-empty and covers a single torrent.
pub(crate) fn batch_torrent_id(records: &[NormalizedRecord]) -> Result<u64, SinkError> {
    let first = records
        .first()
        .ok_or_else(|| SinkError::InvalidBatch("empty batch".to_string()))?;

    if let Some(other) = records.iter().find(|r| r.torrent_id != first.torrent_id) {
        return Err(SinkError::InvalidBatch(format!(
            "mixed torrent ids {} and {}",
            first.torrent_id, other.torrent_id
        )));
    }

    Ok(first.torrent_id)
}
