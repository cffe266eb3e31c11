//! Shared fixtures: a scripted generative backend and context providers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use vestiary::advisor::{ContextError, Coordinates, LocationProvider, WeatherProvider};
use vestiary::backend::IsolatedGarment;
use vestiary::{
    BackendError, Category, GarmentDraft, GenerativeBackend, ImagePayload, OutfitRecommendation,
    WeatherContext,
};

/// Encodes a real PNG so stages that re-decode the payload succeed.
pub fn tiny_png(width: u32, height: u32) -> ImagePayload {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([10, 20, 30, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode fixture png");
    ImagePayload::png(buf)
}

pub fn draft(category: Category, name: &str) -> GarmentDraft {
    GarmentDraft {
        image: tiny_png(4, 4),
        category,
        name: name.to_string(),
        tags: vec!["fixture".to_string()],
    }
}

pub fn recommendation(items: Vec<Category>) -> OutfitRecommendation {
    OutfitRecommendation {
        outfit_name: "Scripted Look".to_string(),
        description: "A look assembled by the test backend.".to_string(),
        items,
    }
}

pub fn sunny() -> WeatherContext {
    WeatherContext {
        temperature_f: 72,
        description: "Clear".to_string(),
        icon_id: "01d".to_string(),
    }
}

/// Scripted backend with per-operation call counters and input recording.
///
/// Recommendations are drawn from a queue so concurrent requests can be
/// told apart; gates let a test hold a call open to exercise overlap and
/// stale-result behavior.
#[derive(Default)]
pub struct MockBackend {
    pub isolate_calls: AtomicUsize,
    pub compose_calls: AtomicUsize,
    pub refine_calls: AtomicUsize,
    pub recommend_calls: AtomicUsize,

    pub compose_inputs: Mutex<Vec<Vec<ImagePayload>>>,
    pub refine_inputs: Mutex<Vec<ImagePayload>>,

    isolated: Mutex<Option<IsolatedGarment>>,
    composite: Mutex<Option<ImagePayload>>,
    refined: Mutex<Option<ImagePayload>>,
    recommendations: Mutex<VecDeque<OutfitRecommendation>>,
    recommend_errors: Mutex<VecDeque<BackendError>>,
    refine_errors: Mutex<VecDeque<BackendError>>,
    recommend_gates: Mutex<VecDeque<Arc<Notify>>>,
    refine_gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_isolated(&self, garment: IsolatedGarment) {
        *self.isolated.lock().unwrap() = Some(garment);
    }

    pub fn script_composite(&self, composite: ImagePayload) {
        *self.composite.lock().unwrap() = Some(composite);
    }

    pub fn script_refined(&self, refined: ImagePayload) {
        *self.refined.lock().unwrap() = Some(refined);
    }

    pub fn script_recommendation(&self, rec: OutfitRecommendation) {
        self.recommendations.lock().unwrap().push_back(rec);
    }

    pub fn script_recommend_error(&self, err: BackendError) {
        self.recommend_errors.lock().unwrap().push_back(err);
    }

    pub fn script_refine_error(&self, err: BackendError) {
        self.refine_errors.lock().unwrap().push_back(err);
    }

    /// The next recommend call blocks until the returned handle is
    /// notified.
    pub fn gate_next_recommend(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.recommend_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    /// The next refine call blocks until the returned handle is notified.
    pub fn gate_next_refine(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.refine_gates.lock().unwrap().push_back(gate.clone());
        gate
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn isolate_garment(
        &self,
        _image: &ImagePayload,
        _category: Category,
    ) -> Result<IsolatedGarment, BackendError> {
        self.isolate_calls.fetch_add(1, Ordering::SeqCst);
        let garment = self.isolated.lock().unwrap().clone();
        Ok(garment.expect("no scripted isolation result"))
    }

    async fn compose_outfit(
        &self,
        _user_photo: &ImagePayload,
        garments: &[ImagePayload],
    ) -> Result<ImagePayload, BackendError> {
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        self.compose_inputs.lock().unwrap().push(garments.to_vec());
        let composite = self.composite.lock().unwrap().clone();
        Ok(composite.expect("no scripted composite"))
    }

    async fn refine_image(
        &self,
        base: &ImagePayload,
        _instruction: &str,
    ) -> Result<ImagePayload, BackendError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        self.refine_inputs.lock().unwrap().push(base.clone());

        let gate = self.refine_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(err) = self.refine_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        let refined = self.refined.lock().unwrap().clone();
        Ok(refined.expect("no scripted refinement"))
    }

    async fn recommend_outfit(
        &self,
        _categories: &[Category],
        _weather: Option<&WeatherContext>,
    ) -> Result<OutfitRecommendation, BackendError> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);
        // Dequeue at entry so concurrent callers observe distinct scripts.
        let rec = self.recommendations.lock().unwrap().pop_front();

        let gate = self.recommend_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(err) = self.recommend_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(rec.expect("no scripted recommendation"))
    }
}

pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, ContextError> {
        Err(ContextError::LocationDenied)
    }
}

pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, ContextError> {
        Ok(self.0)
    }
}

pub struct FixedWeather(pub WeatherContext);

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn lookup(&self, _position: Coordinates) -> Result<WeatherContext, ContextError> {
        Ok(self.0.clone())
    }
}

pub struct UnconfiguredWeather;

#[async_trait]
impl WeatherProvider for UnconfiguredWeather {
    async fn lookup(&self, _position: Coordinates) -> Result<WeatherContext, ContextError> {
        Err(ContextError::Unconfigured)
    }
}
