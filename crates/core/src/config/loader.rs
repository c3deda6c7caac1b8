use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration with environment variable overrides.
///
/// With `None`, only defaults and `GGN_*` variables apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed("GGN_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[crawl]
console = "PlayStation 2"
region = "USA"
limit = 20

[output]
sink = "sqlite"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.crawl.console, "PlayStation 2");
        assert_eq!(config.crawl.region.as_deref(), Some("USA"));
        assert_eq!(config.crawl.limit, Some(20));
        assert_eq!(config.output.sink, SinkKind::Sqlite);
        assert_eq!(config.crawl.request_delay_ms, 2100);
    }

    #[test]
    fn test_load_config_from_str_bad_sink() {
        let toml = r#"
[output]
sink = "parquet"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
timeout_secs = 10

[crawl]
console = "Saturn"
request_delay_ms = 500
special_editions = ["redump", "no-intro"]
"#
        )
        .unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.crawl.console, "Saturn");
        assert_eq!(config.crawl.request_delay_ms, 500);
        assert_eq!(config.crawl.special_editions.len(), 2);
    }
}
