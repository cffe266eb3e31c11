//! Optional geolocation/weather enrichment for recommendations.
//!
//! Both collaborators are best-effort: any failure here downgrades the
//! recommendation to a generic one and is surfaced only as a non-fatal
//! warning, never as a call failure.

use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::model::WeatherContext;

/// A geographic position from the location collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Context-acquisition failures. Absorbed by the orchestrator — these
/// only downgrade context and are never propagated to the caller.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Location access denied")]
    LocationDenied,

    #[error("Location acquisition timed out")]
    LocationTimeout,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Weather API key not configured")]
    Unconfigured,

    #[error("Failed to fetch weather data: {0}")]
    WeatherFetch(String),
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, ContextError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn lookup(&self, position: Coordinates) -> Result<WeatherContext, ContextError>;
}

/// Acquired context: at most one weather snapshot, plus a warning when the
/// chain degraded. Exactly one of the two paths is taken; either way the
/// recommendation proceeds.
#[derive(Debug, Clone, Default)]
pub struct AcquiredContext {
    pub weather: Option<WeatherContext>,
    pub warning: Option<String>,
}

/// Runs the fallback chain: position (with a bounded wait) → weather →
/// generic. Never fails.
pub async fn acquire_context(
    location: &dyn LocationProvider,
    weather: &dyn WeatherProvider,
    location_timeout: Duration,
) -> AcquiredContext {
    let position = match tokio::time::timeout(location_timeout, location.current_position()).await
    {
        Ok(Ok(position)) => position,
        Ok(Err(e)) => {
            warn!("Location unavailable: {}", e);
            return AcquiredContext {
                weather: None,
                warning: Some("Location access denied. Providing a general suggestion.".to_string()),
            };
        }
        Err(_) => {
            warn!(
                "Location acquisition exceeded {:?}, proceeding without context",
                location_timeout
            );
            return AcquiredContext {
                weather: None,
                warning: Some("Location request timed out. Providing a general suggestion.".to_string()),
            };
        }
    };

    match weather.lookup(position).await {
        Ok(context) => {
            info!(
                "Weather context acquired: {}°F, {}",
                context.temperature_f, context.description
            );
            AcquiredContext {
                weather: Some(context),
                warning: None,
            }
        }
        Err(ContextError::Unconfigured) => {
            warn!("Weather lookup unconfigured, proceeding without context");
            AcquiredContext {
                weather: None,
                warning: Some(
                    "Weather API key not configured. Cannot fetch weather data.".to_string(),
                ),
            }
        }
        Err(e) => {
            warn!("Weather lookup failed: {}", e);
            AcquiredContext {
                weather: None,
                warning: Some(
                    "Could not fetch weather data. Providing a general suggestion.".to_string(),
                ),
            }
        }
    }
}

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Current-conditions client for the OpenWeatherMap API.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint base URL. Used by tests against a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    main: OpenWeatherMain,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    main: String,
    icon: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn lookup(&self, position: Coordinates) -> Result<WeatherContext, ContextError> {
        let key = self.api_key.as_ref().ok_or(ContextError::Unconfigured)?;

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", position.latitude.to_string()),
                ("lon", position.longitude.to_string()),
                ("units", "imperial".to_string()),
                ("appid", key.expose_secret().to_string()),
            ])
            .send()
            .await
            .map_err(|e| ContextError::WeatherFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ContextError::WeatherFetch(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|e| ContextError::WeatherFetch(e.to_string()))?;

        let condition = body.weather.into_iter().next().ok_or_else(|| {
            ContextError::WeatherFetch("response contained no weather conditions".to_string())
        })?;

        Ok(WeatherContext {
            temperature_f: body.main.temp.round() as i32,
            description: condition.main,
            icon_id: condition.icon,
        })
    }
}
