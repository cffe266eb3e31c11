//! Garment isolation stage: raw upload + category in, save-able draft out.

use std::sync::Arc;

use log::info;
use tracing::Instrument;

use crate::backend::GenerativeBackend;
use crate::catalog::model::{Category, GarmentDraft, ImagePayload};
use crate::error::{Result, VestiaryError};
use crate::imaging;

pub struct IsolationStage {
    backend: Arc<dyn GenerativeBackend>,
    max_dimension: u32,
}

impl IsolationStage {
    pub fn new(backend: Arc<dyn GenerativeBackend>, max_dimension: u32) -> Self {
        Self {
            backend,
            max_dimension,
        }
    }

    /// Runs one isolation exchange and normalizes the returned image.
    ///
    /// The result is an unsaved draft; it only becomes a catalog record
    /// through an explicit `CatalogStore::add_item` after user
    /// confirmation.
    pub async fn run(&self, upload: &ImagePayload, category: Category) -> Result<GarmentDraft> {
        if upload.mime_type.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "missing image mime type for processing".to_string(),
            ));
        }
        if upload.data.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "uploaded image is empty".to_string(),
            ));
        }

        let isolated = self
            .backend
            .isolate_garment(upload, category)
            .instrument(tracing::info_span!("pipeline.isolation"))
            .await?;
        let image = imaging::normalize(&isolated.image, self.max_dimension)?;

        info!(
            "Isolated {} garment '{}' ({} tag(s))",
            category,
            isolated.name,
            isolated.tags.len()
        );

        Ok(GarmentDraft {
            image,
            category,
            name: isolated.name,
            tags: isolated.tags,
        })
    }
}
