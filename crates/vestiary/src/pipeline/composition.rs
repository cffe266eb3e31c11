//! Outfit composition stage: user photo + ordered garments in, one
//! photorealistic try-on composite out.

use std::sync::Arc;

use log::info;
use tracing::Instrument;

use crate::backend::GenerativeBackend;
use crate::catalog::model::{ImagePayload, UserPhoto};
use crate::error::{Result, VestiaryError};

pub struct CompositionStage {
    backend: Arc<dyn GenerativeBackend>,
}

impl CompositionStage {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Runs one composition exchange. Contract violations (empty garment
    /// list, missing mime types) are rejected before any network I/O.
    pub async fn run(
        &self,
        user_photo: &UserPhoto,
        garments: &[ImagePayload],
    ) -> Result<ImagePayload> {
        if garments.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "no clothing items provided for try-on".to_string(),
            ));
        }
        if user_photo.image.mime_type.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "missing body image mime type for generation".to_string(),
            ));
        }
        if let Some(position) = garments.iter().position(|g| g.mime_type.is_empty()) {
            return Err(VestiaryError::InvalidInput(format!(
                "clothing item at position {} is missing a mime type",
                position
            )));
        }

        let composite = self
            .backend
            .compose_outfit(&user_photo.image, garments)
            .instrument(tracing::info_span!("pipeline.composition"))
            .await?;
        info!("Composed try-on image from {} garment(s)", garments.len());
        Ok(composite)
    }
}
