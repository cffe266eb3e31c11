use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VestiaryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Imaging error: {0}")]
    Imaging(#[from] ImagingError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A refinement is already in progress for this image")]
    RefinementPending,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Errors raised by the generative backend boundary.
///
/// Transport failures, HTTP-level rejections, and responses whose shape
/// violates the expected contract all land here. None of these are retried;
/// each is terminal for the single call that raised it.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Generative backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generative backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("The request was blocked for safety reasons related to: {categories}")]
    SafetyBlocked { categories: String },

    #[error("Incomplete model response: {0}")]
    IncompleteResponse(String),

    #[error("Failed to parse metadata from model response: {0}")]
    MetadataParse(String),

    #[error("The model did not suggest any items for the outfit")]
    EmptyRecommendation,

    #[error("Recommendation referenced unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Generative backend API key is not configured")]
    MissingApiKey,
}

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize catalog state: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read key '{key}': {source}")]
    ReadKey {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}': {source}")]
    WriteKey {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize value for key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, VestiaryError>;
