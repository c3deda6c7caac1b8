//! Region presets used to narrow a crawl.

use serde::Serialize;

const JPN_REGIONS: &[&str] = &["Japan", "NTSC-J"];
const EUR_REGIONS: &[&str] = &["Europe", "PAL", "PAL-E"];
const USA_REGIONS: &[&str] = &["USA", "NTSC"];

/// One of the four region modes a crawl can run in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    #[default]
    Unrestricted,
    Japan,
    Europe,
    Usa,
}

impl RegionFilter {
    /// Map a user-supplied selector onto a filter.
    ///
    /// Unrecognized input (including empty) is unrestricted.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim() {
            "Japan" | "JPN" => RegionFilter::Japan,
            "Europe" | "EUR" => RegionFilter::Europe,
            "USA" => RegionFilter::Usa,
            _ => RegionFilter::Unrestricted,
        }
    }

    /// Tokens the preset expands to; empty when unrestricted.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            RegionFilter::Unrestricted => &[],
            RegionFilter::Japan => JPN_REGIONS,
            RegionFilter::Europe => EUR_REGIONS,
            RegionFilter::Usa => USA_REGIONS,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, RegionFilter::Unrestricted)
    }

    /// Whether a torrent listed under `region` passes the filter.
    ///
    /// The torrent's region must appear inside one of the preset tokens.
    pub fn accepts(&self, region: &str) -> bool {
        self.is_unrestricted() || self.tokens().iter().any(|token| token.contains(region))
    }
}

impl std::fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unrestricted() {
            write!(f, "all regions")
        } else {
            write!(f, "{}", self.tokens().join(", "))
        }
    }
}
