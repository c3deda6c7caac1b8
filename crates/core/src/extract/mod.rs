//! Free-text extraction helpers.
//!
//! Tracker descriptions arrive HTML-escaped (sometimes more than once) and
//! carry redump.org links in whatever slash style the uploader typed.

mod disc_id;
mod entities;

pub use disc_id::extract_disc_id;
pub use entities::decode_entities;
