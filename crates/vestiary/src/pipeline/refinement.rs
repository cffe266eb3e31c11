//! Sequential refinement of a generated composite.
//!
//! Each refinement call is stateless except that its input is the most
//! recent output — edits chain. Overlapping refinements against the same
//! composite are rejected rather than queued, so two edits can never race
//! on the same base image.

use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};
use tracing::Instrument;

use crate::backend::GenerativeBackend;
use crate::catalog::model::ImagePayload;
use crate::error::{Result, VestiaryError};

pub struct RefinementSession {
    backend: Arc<dyn GenerativeBackend>,
    current: Mutex<ImagePayload>,
    in_flight: tokio::sync::Mutex<()>,
}

impl RefinementSession {
    /// Starts a refinement chain on a freshly generated composite.
    pub fn new(backend: Arc<dyn GenerativeBackend>, composite: ImagePayload) -> Self {
        Self {
            backend,
            current: Mutex::new(composite),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// The image currently shown: the initial composite, or the output of
    /// the latest successful refinement.
    pub fn current(&self) -> ImagePayload {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies one free-text edit to the current image.
    ///
    /// On success the session advances to the new image and returns it.
    /// On failure the previously displayed image remains the session
    /// state. A call made while another refinement is pending fails with
    /// [`VestiaryError::RefinementPending`].
    pub async fn refine(&self, instruction: &str) -> Result<ImagePayload> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| VestiaryError::RefinementPending)?;

        if instruction.trim().is_empty() {
            return Err(VestiaryError::InvalidInput(
                "refinement instruction is empty".to_string(),
            ));
        }

        let base = self.current();
        if base.mime_type.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "missing base image mime type for editing".to_string(),
            ));
        }

        let outcome = self
            .backend
            .refine_image(&base, instruction)
            .instrument(tracing::info_span!("pipeline.refinement"))
            .await;
        match outcome {
            Ok(refined) => {
                *self
                    .current
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = refined.clone();
                info!("Applied refinement: {}", instruction);
                Ok(refined)
            }
            Err(e) => {
                warn!("Refinement failed, keeping previous image: {}", e);
                Err(e.into())
            }
        }
    }
}
