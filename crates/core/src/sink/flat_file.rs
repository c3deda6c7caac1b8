//! CSV sink.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use csv::{Writer, WriterBuilder};

use super::{batch_torrent_id, RecordSink, SinkError};
use crate::normalize::{NormalizedRecord, CSV_HEADER};

/// Appends one CSV row per record after a fixed header.
///
/// Rows are flushed after every torrent so an interrupted run keeps what it
/// already wrote.
pub struct CsvSink<W: Write + Send = File> {
    writer: Mutex<Writer<W>>,
}

impl CsvSink<File> {
    /// Create (or truncate) the output file and write the header.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)
            .map_err(|e| SinkError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_writer(file)
    }
}

impl<W: Write + Send> CsvSink<W> {
    /// Wrap any writer and write the header.
    pub fn from_writer(inner: W) -> Result<Self, SinkError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| SinkError::LockPoisoned)?;
        writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.error().to_string()))
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn name(&self) -> &str {
        "csv"
    }

    fn write(&self, records: &[NormalizedRecord]) -> Result<usize, SinkError> {
        batch_torrent_id(records)?;

        let mut writer = self.writer.lock().map_err(|_| SinkError::LockPoisoned)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(records.len())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::LockPoisoned)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(
        torrent_id: u64,
        file_index: Option<u32>,
        file_name: Option<&str>,
    ) -> NormalizedRecord {
        NormalizedRecord {
            group_id: 1,
            group_name: "Chrono Cross, Disc 1".to_string(),
            group_year: Some(2000),
            torrent_id,
            info_hash: Some("HASH".to_string()),
            region: Some("USA".to_string()),
            language: Some("English".to_string()),
            remaster_year: None,
            remaster_title: "Redump".to_string(),
            release_title: "Say \"hi\"".to_string(),
            release_type: Some("Game".to_string()),
            file_index,
            file_name: file_name.map(str::to_string),
            redump_nr: Some(42),
        }
    }

    fn output(sink: CsvSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_only() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        assert_eq!(
            output(sink),
            "group_id,group_name,group_year,torrent_id,info_hash,region,language,\
             remaster_year,remaster_title,release_title,release_type,file_index,\
             file_name,redump_nr\n"
        );
    }

    #[test]
    fn test_rows_quoted_and_empty_for_absent() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        let written = sink.write(&[record(9, None, None)]).unwrap();
        assert_eq!(written, 1);

        let text = output(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let expected = concat!(
            "1,\"Chrono Cross, Disc 1\",2000,9,HASH,USA,English,,",
            "Redump,\"Say \"\"hi\"\"\",Game,,,42"
        );
        assert_eq!(lines[1], expected);
    }

    #[test]
    fn test_appends_across_batches() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.write(&[record(1, Some(1), Some("a.bin")), record(1, Some(2), Some("a.cue"))])
            .unwrap();
        sink.write(&[record(2, None, None)]).unwrap();

        let text = output(sink);
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][11], "1");
        assert_eq!(&rows[0][12], "a.bin");
        assert_eq!(&rows[1][11], "2");
        assert_eq!(&rows[2][3], "2");
        assert_eq!(&rows[2][11], "");
    }

    #[test]
    fn test_rejects_mixed_batch() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        let result = sink.write(&[record(1, None, None), record(2, None, None)]);
        assert!(matches!(result, Err(SinkError::InvalidBatch(_))));
        assert!(matches!(sink.write(&[]), Err(SinkError::InvalidBatch(_))));
    }

    #[test]
    fn test_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Saturn_metadata.csv");

        let sink = CsvSink::create(&path).unwrap();
        sink.write(&[record(5, Some(1), Some("game.iso"))]).unwrap();

        // Rows are on disk before the sink is dropped.
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("game.iso"));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let result = CsvSink::create(Path::new("/nonexistent/dir/out.csv"));
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
