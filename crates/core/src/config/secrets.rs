use serde::Deserialize;
use std::path::Path;

use super::{types::ApiConfig, ConfigError};

/// Contents of the secrets file.
#[derive(Deserialize)]
pub struct Secrets {
    pub api_key: String,
}

/// Read `{"api_key": "..."}` from a JSON file.
pub fn load_secrets(path: &Path) -> Result<Secrets, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Secrets(format!("{}: {}", path.display(), e)))?;

    let secrets: Secrets = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::Secrets(format!("{}: {}", path.display(), e)))?;

    if secrets.api_key.trim().is_empty() {
        return Err(ConfigError::Secrets(format!(
            "{}: api_key is empty",
            path.display()
        )));
    }

    Ok(secrets)
}

/// Resolve the API key: inline config first, then the secrets file.
pub fn resolve_api_key(api: &ApiConfig) -> Result<String, ConfigError> {
    match api.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => load_secrets(&api.secrets_path).map(|s| s.api_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_secrets() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "abc123"}}"#).unwrap();

        let secrets = load_secrets(file.path()).unwrap();
        assert_eq!(secrets.api_key, "abc123");
    }

    #[test]
    fn test_load_secrets_missing_file() {
        let result = load_secrets(Path::new("/nonexistent/secrets.json"));
        assert!(matches!(result, Err(ConfigError::Secrets(_))));
    }

    #[test]
    fn test_load_secrets_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "api_key=abc123").unwrap();
        assert!(matches!(
            load_secrets(file.path()),
            Err(ConfigError::Secrets(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": ""}}"#).unwrap();
        assert!(matches!(
            load_secrets(file.path()),
            Err(ConfigError::Secrets(_))
        ));
    }

    #[test]
    fn test_inline_key_takes_precedence() {
        let api = ApiConfig {
            api_key: Some("inline".to_string()),
            secrets_path: "/nonexistent/secrets.json".into(),
            ..ApiConfig::default()
        };
        assert_eq!(resolve_api_key(&api).unwrap(), "inline");
    }

    #[test]
    fn test_falls_back_to_secrets_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "from-file"}}"#).unwrap();

        let api = ApiConfig {
            api_key: Some("   ".to_string()),
            secrets_path: file.path().to_path_buf(),
            ..ApiConfig::default()
        };
        assert_eq!(resolve_api_key(&api).unwrap(), "from-file");
    }
}
