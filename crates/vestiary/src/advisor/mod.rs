pub mod context;
pub mod orchestrator;
pub mod selection;

pub use context::{
    acquire_context, AcquiredContext, ContextError, Coordinates, LocationProvider,
    OpenWeatherClient, WeatherProvider,
};
pub use orchestrator::{AdvisorPhase, AdvisorState, StyleAdvisor};
pub use selection::{pick_outfit_items, CategoryLookup, OutfitSlot};
