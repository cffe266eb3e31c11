//! Recommendation orchestrator.
//!
//! State machine: `AcquiringContext → RequestingRecommendation →
//! Ready | Failed`, with an `InsufficientCatalog` short-circuit before any
//! backend call. Context acquisition happens at most once per activation;
//! later requests reuse the last known weather. Context failures only
//! downgrade the request and never surface as call failures.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use crate::advisor::context::{acquire_context, LocationProvider, WeatherProvider};
use crate::advisor::selection::{pick_outfit_items, CategoryLookup, OutfitSlot};
use crate::backend::GenerativeBackend;
use crate::catalog::model::{ImagePayload, OutfitRecommendation, WeatherContext};
use crate::catalog::CatalogStore;
use crate::error::{Result, VestiaryError};
use crate::pipeline::CompositionStage;

const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisorPhase {
    #[default]
    Idle,
    AcquiringContext,
    RequestingRecommendation,
    Ready,
    /// Fewer than two distinct categories in the catalog. A condition,
    /// not an error — no backend call was made.
    InsufficientCatalog,
    Failed,
}

/// Observable advisor state. Presentation surfaces subscribe to this and
/// hold no private copies.
#[derive(Debug, Clone, Default)]
pub struct AdvisorState {
    pub phase: AdvisorPhase,
    pub weather: Option<WeatherContext>,
    /// Non-fatal context degradation notice, distinct from `error`.
    pub context_warning: Option<String>,
    pub recommendation: Option<OutfitRecommendation>,
    pub slots: Vec<OutfitSlot>,
    pub composite: Option<ImagePayload>,
    /// Failure message, verbatim from the failed call. Set only in
    /// `Failed` phase.
    pub error: Option<String>,
}

pub struct StyleAdvisor {
    catalog: Arc<CatalogStore>,
    backend: Arc<dyn GenerativeBackend>,
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherProvider>,
    composition: CompositionStage,
    location_timeout: Duration,
    rng: Mutex<StdRng>,
    state: Mutex<AdvisorState>,
    state_tx: watch::Sender<AdvisorState>,
    context_acquired: AtomicBool,
    /// Bumped by every superseding user action; a completing call whose
    /// generation is stale discards its result instead of applying it.
    generation: AtomicU64,
}

impl StyleAdvisor {
    pub fn new(
        catalog: Arc<CatalogStore>,
        backend: Arc<dyn GenerativeBackend>,
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        let (state_tx, _) = watch::channel(AdvisorState::default());
        Self {
            catalog,
            composition: CompositionStage::new(backend.clone()),
            backend,
            location,
            weather,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            rng: Mutex::new(StdRng::from_entropy()),
            state: Mutex::new(AdvisorState::default()),
            state_tx,
            context_acquired: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Replaces the random source. Tests inject a seeded generator here.
    pub fn with_rng(self, rng: StdRng) -> Self {
        *self.rng.lock().unwrap_or_else(PoisonError::into_inner) = rng;
        self
    }

    pub fn state(&self) -> AdvisorState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdvisorState> {
        self.state_tx.subscribe()
    }

    /// View activation: acquires context once, then requests the first
    /// recommendation. Re-activation skips straight to the request.
    pub async fn activate(&self) -> Result<()> {
        if !self.context_acquired.swap(true, Ordering::SeqCst) {
            self.update(|s| s.phase = AdvisorPhase::AcquiringContext);

            let acquired = acquire_context(
                self.location.as_ref(),
                self.weather.as_ref(),
                self.location_timeout,
            )
            .await;

            self.update(|s| {
                s.weather = acquired.weather.clone();
                s.context_warning = acquired.warning.clone();
            });
        }

        self.request_recommendation().await
    }

    /// Issues one recommendation exchange using the last known weather
    /// context. Short-circuits without any backend call when the catalog
    /// exposes fewer than two categories.
    pub async fn request_recommendation(&self) -> Result<()> {
        let generation = self.bump_generation();

        let categories = self.catalog.available_categories();
        if categories.len() < 2 {
            info!(
                "Catalog exposes {} category(ies), need 2 — skipping recommendation",
                categories.len()
            );
            self.update(|s| {
                s.phase = AdvisorPhase::InsufficientCatalog;
                s.recommendation = None;
                s.slots.clear();
                s.composite = None;
                s.error = None;
            });
            return Ok(());
        }

        let weather = self
            .update(|s| {
                s.phase = AdvisorPhase::RequestingRecommendation;
                s.recommendation = None;
                s.slots.clear();
                s.composite = None;
                s.error = None;
            })
            .weather;

        let result = self
            .backend
            .recommend_outfit(&categories, weather.as_ref())
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding superseded recommendation result");
            return Ok(());
        }

        match result {
            Ok(recommendation) => {
                let slots = self.select_items(&recommendation);
                info!(
                    "Recommendation ready: '{}' with {} slot(s)",
                    recommendation.outfit_name,
                    slots.len()
                );
                self.update(|s| {
                    s.phase = AdvisorPhase::Ready;
                    s.recommendation = Some(recommendation);
                    s.slots = slots;
                });
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.update(|s| {
                    s.phase = AdvisorPhase::Failed;
                    s.error = Some(message);
                });
                Err(e.into())
            }
        }
    }

    /// Re-picks concrete items for the current recommendation without
    /// touching the backend. The previously generated composite is
    /// discarded since the underlying garments changed.
    pub fn shuffle(&self) {
        self.bump_generation();

        let recommendation = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recommendation
            .clone();
        let Some(recommendation) = recommendation else {
            debug!("Shuffle with no recommendation is a no-op");
            return;
        };

        let slots = self.select_items(&recommendation);
        self.update(|s| {
            s.slots = slots;
            s.composite = None;
        });
    }

    /// Composes a try-on image from the currently resolved slots; unfilled
    /// slots contribute nothing.
    pub async fn try_on(&self) -> Result<ImagePayload> {
        let generation = self.generation.load(Ordering::SeqCst);

        let user_photo = self.catalog.user_photo().ok_or_else(|| {
            VestiaryError::InvalidInput("no user reference photo on file".to_string())
        })?;

        let (has_recommendation, garments) = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let garments: Vec<ImagePayload> = state
                .slots
                .iter()
                .filter_map(|slot| slot.item.as_ref().map(|item| item.image.clone()))
                .collect();
            (state.recommendation.is_some(), garments)
        };

        if !has_recommendation {
            return Err(VestiaryError::InvalidInput(
                "no recommendation to try on".to_string(),
            ));
        }
        if garments.is_empty() {
            return Err(VestiaryError::InvalidInput(
                "no items to try on for this look".to_string(),
            ));
        }

        match self.composition.run(&user_photo, &garments).await {
            Ok(composite) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    let snapshot = composite.clone();
                    self.update(|s| s.composite = Some(snapshot));
                } else {
                    debug!("Discarding superseded composite");
                }
                Ok(composite)
            }
            Err(e) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    let message = e.to_string();
                    self.update(|s| {
                        s.phase = AdvisorPhase::Failed;
                        s.error = Some(message);
                    });
                }
                Err(e)
            }
        }
    }

    fn select_items(&self, recommendation: &OutfitRecommendation) -> Vec<OutfitSlot> {
        let lookup = CategoryLookup::from_records(&self.catalog.items());
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pick_outfit_items(recommendation, &lookup, &mut *rng)
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn update<F: FnOnce(&mut AdvisorState)>(&self, f: F) -> AdvisorState {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut state);
            state.clone()
        };
        self.state_tx.send_replace(snapshot.clone());
        snapshot
    }
}
