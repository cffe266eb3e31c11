//! Generative backend boundary: the four request/response exchanges the
//! core delegates pixel-level understanding to.

pub mod gemini;
pub mod prompt;
pub mod wire;

pub use gemini::{GeminiBackend, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

use async_trait::async_trait;

use crate::catalog::model::{Category, ImagePayload, OutfitRecommendation, WeatherContext};
use crate::error::BackendError;

/// Result of the garment isolation exchange: the background-removed image
/// plus generated metadata.
#[derive(Debug, Clone)]
pub struct IsolatedGarment {
    pub image: ImagePayload,
    pub name: String,
    pub tags: Vec<String>,
}

/// The remote generative service, abstracted for tests.
///
/// Implementations validate every response against the shapes below before
/// returning it; callers never see partial results. All errors are terminal
/// for the single call that raised them — retry is a new explicit call.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Isolates the garment matching `category` from a raw upload and
    /// generates a name plus 3-5 lowercase tags for it.
    async fn isolate_garment(
        &self,
        image: &ImagePayload,
        category: Category,
    ) -> Result<IsolatedGarment, BackendError>;

    /// Composites the user photo with the supplied garments, layered in
    /// order, into one photorealistic try-on image.
    async fn compose_outfit(
        &self,
        user_photo: &ImagePayload,
        garments: &[ImagePayload],
    ) -> Result<ImagePayload, BackendError>;

    /// Applies a single free-text edit to a previously generated composite,
    /// preserving everything the instruction does not target.
    async fn refine_image(
        &self,
        base: &ImagePayload,
        instruction: &str,
    ) -> Result<ImagePayload, BackendError>;

    /// Produces one outfit suggestion drawn from the supplied categories,
    /// optionally informed by weather context. Returned items are
    /// guaranteed non-empty and a subset of `categories`.
    async fn recommend_outfit(
        &self,
        categories: &[Category],
        weather: Option<&WeatherContext>,
    ) -> Result<OutfitRecommendation, BackendError>;
}
