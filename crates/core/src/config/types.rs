use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::region::RegionFilter;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Tracker API configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Endpoint every request is issued against (e.g., "https://gazellegames.net/api.php")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// JSON file holding `{"api_key": "..."}`
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,
    /// Inline API key, takes precedence over the secrets file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            secrets_path: default_secrets_path(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("secrets_path", &self.secrets_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_base_url() -> String {
    "https://gazellegames.net/api.php".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from("secrets.json")
}

/// What to crawl and how fast
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Console name as the tracker lists it (case-sensitive)
    #[serde(default)]
    pub console: String,
    /// Region selector: "Japan"/"JPN", "Europe"/"EUR", "USA"; anything else is unrestricted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Maximum number of candidate torrents to collect (unlimited when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Pause after every looped request, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Remaster-title markers that flag a special edition
    #[serde(default = "default_special_editions")]
    pub special_editions: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            console: String::new(),
            region: None,
            limit: None,
            request_delay_ms: default_request_delay_ms(),
            special_editions: default_special_editions(),
        }
    }
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn region_filter(&self) -> RegionFilter {
        RegionFilter::from_selector(self.region.as_deref().unwrap_or(""))
    }
}

fn default_request_delay_ms() -> u64 {
    2100
}

fn default_special_editions() -> Vec<String> {
    vec!["redump".to_string()]
}

/// Where normalized records go
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub sink: SinkKind,
    /// CSV target (default: "{console}_metadata.csv")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            csv_path: None,
            database_path: default_database_path(),
        }
    }
}

impl OutputConfig {
    /// Resolve the CSV target, deriving it from the console name when unset.
    pub fn csv_path_for(&self, console: &str) -> PathBuf {
        self.csv_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_metadata.csv", console)))
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("ggn_redump.db")
}

/// Available sinks
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Csv,
    Sqlite,
}

impl std::str::FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(SinkKind::Csv),
            "sqlite" | "db" => Ok(SinkKind::Sqlite),
            other => Err(format!("unknown sink '{}', expected csv or sqlite", other)),
        }
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub timeout_secs: u32,
    pub secrets_path: PathBuf,
    pub api_key_inline: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                timeout_secs: config.api.timeout_secs,
                secrets_path: config.api.secrets_path.clone(),
                api_key_inline: config.api.api_key.is_some(),
            },
            crawl: config.crawl.clone(),
            output: config.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_constants() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://gazellegames.net/api.php");
        assert_eq!(config.crawl.request_delay(), Duration::from_millis(2100));
        assert_eq!(config.crawl.special_editions, vec!["redump".to_string()]);
        assert_eq!(config.output.sink, SinkKind::Csv);
        assert_eq!(config.output.database_path, PathBuf::from("ggn_redump.db"));
    }

    #[test]
    fn test_csv_path_derived_from_console() {
        let output = OutputConfig::default();
        assert_eq!(
            output.csv_path_for("PlayStation 2"),
            PathBuf::from("PlayStation 2_metadata.csv")
        );

        let output = OutputConfig {
            csv_path: Some(PathBuf::from("out.csv")),
            ..OutputConfig::default()
        };
        assert_eq!(output.csv_path_for("Saturn"), PathBuf::from("out.csv"));
    }

    #[test]
    fn test_sink_kind_from_str() {
        assert_eq!("csv".parse::<SinkKind>().unwrap(), SinkKind::Csv);
        assert_eq!("SQLite".parse::<SinkKind>().unwrap(), SinkKind::Sqlite);
        assert!("parquet".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_api_config_debug_redacts_key() {
        let api = ApiConfig {
            api_key: Some("super-secret".to_string()),
            ..ApiConfig::default()
        };
        let rendered = format!("{:?}", api);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_sanitized_config_hides_key() {
        let mut config = Config::default();
        config.api.api_key = Some("super-secret".to_string());
        let json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("\"api_key_inline\":true"));
    }
}
