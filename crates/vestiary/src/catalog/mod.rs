pub mod model;
pub mod store;

pub use model::{
    Category, GarmentDraft, GarmentRecord, ImagePayload, OutfitRecommendation, UserPhoto,
    WeatherContext,
};
pub use store::CatalogStore;
