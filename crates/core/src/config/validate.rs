use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - A console is set
/// - limit, when set, is not 0
/// - At least one special-edition marker
/// - API timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.crawl.console.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "crawl.console must be set".to_string(),
        ));
    }

    if config.crawl.limit == Some(0) {
        return Err(ConfigError::ValidationError(
            "crawl.limit cannot be 0 (omit it for no limit)".to_string(),
        ));
    }

    if config
        .crawl
        .special_editions
        .iter()
        .all(|marker| marker.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "crawl.special_editions needs at least one marker".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
