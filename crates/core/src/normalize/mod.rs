//! Flattening of tracker records into output rows.

mod record;

pub use record::{normalize, NormalizedRecord, CSV_HEADER};
