use std::path::Path;

use log::info;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        // A missing config file is the normal first-run state.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.max_image_dimension == 0 {
        return Err(ConfigError::Validation {
            message: "maxImageDimension must be at least 1".to_string(),
        });
    }

    if config.image_model.trim().is_empty() || config.text_model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "model names must not be empty".to_string(),
        });
    }

    if config.location_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "locationTimeoutSecs must be at least 1".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(tmp.path().join("absent.json")).unwrap();
        assert_eq!(config.max_image_dimension, 512);
        assert_eq!(config.image_model, "gemini-2.5-flash-image-preview");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config =
            load_config_from_str(r#"{"maxImageDimension": 256, "geminiApiKey": "k"}"#).unwrap();
        assert_eq!(config.max_image_dimension, 256);
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.gemini_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = load_config_from_str(r#"{"maxImageDimension": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn empty_model_name_is_rejected() {
        let err = load_config_from_str(r#"{"imageModel": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = load_config_from_str("{nope").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn direct_key_takes_priority_over_env() {
        use secrecy::ExposeSecret;
        let config = load_config_from_str(r#"{"geminiApiKey": "direct"}"#).unwrap();
        assert_eq!(config.gemini_key().unwrap().expose_secret(), "direct");
    }
}
