//! In-memory sink for testing.

use std::sync::Mutex;

use crate::normalize::NormalizedRecord;
use crate::sink::{batch_torrent_id, RecordSink, SinkError};

/// Keeps every written batch in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<NormalizedRecord>>>,
    next_error: Mutex<Option<SinkError>>,
    flushes: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches in write order, one per torrent.
    pub fn batches(&self) -> Vec<Vec<NormalizedRecord>> {
        self.batches.lock().unwrap().clone()
    }

    /// All records in write order.
    pub fn records(&self) -> Vec<NormalizedRecord> {
        self.batches().into_iter().flatten().collect()
    }

    /// Make the next write fail with the given error.
    pub fn fail_next_write(&self, error: SinkError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

impl RecordSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&self, records: &[NormalizedRecord]) -> Result<usize, SinkError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        batch_torrent_id(records)?;
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(records.len())
    }

    fn flush(&self) -> Result<(), SinkError> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}
