pub mod advisor;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod pipeline;
pub mod storage;

pub use advisor::{AdvisorPhase, AdvisorState, StyleAdvisor};
pub use backend::{GeminiBackend, GenerativeBackend, IsolatedGarment};
pub use catalog::{
    CatalogStore, Category, GarmentDraft, GarmentRecord, ImagePayload, OutfitRecommendation,
    UserPhoto, WeatherContext,
};
pub use config::{load_config, Config};
pub use error::{
    BackendError, CatalogError, ConfigError, ImagingError, Result, StorageError, VestiaryError,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
