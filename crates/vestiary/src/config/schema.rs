use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::backend::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::imaging::DEFAULT_MAX_DIMENSION;

/// Environment variable consulted when the config omits the backend key.
pub const GEMINI_KEY_ENV: &str = "VESTIARY_GEMINI_API_KEY";

/// Environment variable consulted when the config omits the weather key.
pub const WEATHER_KEY_ENV: &str = "VESTIARY_WEATHER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Longer-side bound applied by image normalization.
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Backend API key. Falls back to `VESTIARY_GEMINI_API_KEY`.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Weather API key. Optional — absence downgrades recommendations to
    /// generic ones. Falls back to `VESTIARY_WEATHER_API_KEY`.
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// Bounded wait for geolocation, in seconds.
    #[serde(default = "default_location_timeout_secs")]
    pub location_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("vestiary"))
        .unwrap_or_else(|| PathBuf::from(".vestiary"))
}

fn default_max_image_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_location_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_image_dimension: default_max_image_dimension(),
            image_model: default_image_model(),
            text_model: default_text_model(),
            gemini_api_key: None,
            weather_api_key: None,
            location_timeout_secs: default_location_timeout_secs(),
        }
    }
}

impl Config {
    /// Resolves the backend key: direct config value first, then the
    /// environment.
    pub fn gemini_key(&self) -> Option<SecretString> {
        resolve_key(self.gemini_api_key.as_deref(), GEMINI_KEY_ENV)
    }

    pub fn weather_key(&self) -> Option<SecretString> {
        resolve_key(self.weather_api_key.as_deref(), WEATHER_KEY_ENV)
    }

    pub fn location_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.location_timeout_secs)
    }
}

fn resolve_key(direct: Option<&str>, env_var: &str) -> Option<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Some(SecretString::from(value.to_string()));
    }
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
