//! Redump disc-ID extraction.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::decode_entities;

/// `redump.org/disc/<n>` with any mix of repeated `/` or `\` separators.
static REDUMP_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"redump\.org[\\/]+disc[\\/]+(\d+)").expect("valid regex"));

/// Looser `disc/<n>` anywhere in the text.
static DISC_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"disc[\\/]+(\d+)").expect("valid regex"));

/// Pull the redump disc number out of a torrent description.
///
/// Entities are decoded first. A full redump.org link wins over a bare
/// `disc/<n>` path; within a pattern the first occurrence wins. Returns
/// `None` for absent or empty text, no match, or a digit run that does not
/// fit in a `u64`.
pub fn extract_disc_id(text: Option<&str>) -> Option<u64> {
    let text = text.filter(|t| !t.is_empty())?;
    let decoded = decode_entities(text);

    [&*REDUMP_LINK, &*DISC_PATH]
        .into_iter()
        .find_map(|pattern| pattern.captures(&decoded))
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}
