//! REST client for the generative backend.
//!
//! One `generateContent` exchange per operation; responses are validated
//! against the contracts in the trait documentation before being accepted.
//! No retries — a failed exchange is terminal for that call.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::backend::prompt;
use crate::backend::wire::{
    Content, GarmentMetadata, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, RecommendationPayload,
};
use crate::backend::{GenerativeBackend, IsolatedGarment};
use crate::catalog::model::{Category, ImagePayload, OutfitRecommendation, WeatherContext};
use crate::config::Config;
use crate::error::BackendError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model handling interleaved image+text generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Model handling structured text generation.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

// SecretString keeps the key redacted in Debug output.
#[derive(Debug)]
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    image_model: String,
    text_model: String,
}

impl GeminiBackend {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }

    /// Builds a client from the application config, resolving the API key
    /// through its direct-value-then-environment chain.
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let api_key = config.gemini_key().ok_or(BackendError::MissingApiKey)?;
        Ok(Self::new(api_key)
            .with_models(config.image_model.as_str(), config.text_model.as_str()))
    }

    /// Overrides the endpoint base URL. Used by tests against a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        image_model: impl Into<String>,
        text_model: impl Into<String>,
    ) -> Self {
        self.image_model = image_model.into();
        self.text_model = text_model.into();
        self
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BackendError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("POST {} ({} content block(s))", url, request.contents.len());

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Backend returned HTTP {}: {}", status, message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    fn single_content(parts: Vec<Part>) -> Vec<Content> {
        vec![Content { parts }]
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn isolate_garment(
        &self,
        image: &ImagePayload,
        category: Category,
    ) -> Result<IsolatedGarment, BackendError> {
        let request = GenerateContentRequest {
            contents: Self::single_content(vec![
                Part::image(image),
                Part::text(prompt::isolation_instruction(category)),
            ]),
            generation_config: Some(GenerationConfig::image_and_text()),
        };

        let response = self.generate(&self.image_model, &request).await?;
        parse_isolation_response(&response)
    }

    async fn compose_outfit(
        &self,
        user_photo: &ImagePayload,
        garments: &[ImagePayload],
    ) -> Result<ImagePayload, BackendError> {
        let mut parts = Vec::with_capacity(garments.len() + 2);
        parts.push(Part::image(user_photo));
        parts.extend(garments.iter().map(Part::image));
        parts.push(Part::text(prompt::composition_instruction()));

        let request = GenerateContentRequest {
            contents: Self::single_content(parts),
            generation_config: Some(GenerationConfig::image_and_text()),
        };

        let response = self.generate(&self.image_model, &request).await?;
        first_image(&response)
            .ok_or_else(|| {
                BackendError::IncompleteResponse(
                    "the model did not return a generated outfit image".to_string(),
                )
            })?
    }

    async fn refine_image(
        &self,
        base: &ImagePayload,
        instruction: &str,
    ) -> Result<ImagePayload, BackendError> {
        let request = GenerateContentRequest {
            contents: Self::single_content(vec![
                Part::image(base),
                Part::text(prompt::refinement_instruction(instruction)),
            ]),
            generation_config: Some(GenerationConfig::image_and_text()),
        };

        let response = self.generate(&self.image_model, &request).await?;
        first_image(&response)
            .ok_or_else(|| {
                BackendError::IncompleteResponse(
                    "the model did not return an edited image".to_string(),
                )
            })?
    }

    async fn recommend_outfit(
        &self,
        categories: &[Category],
        weather: Option<&WeatherContext>,
    ) -> Result<OutfitRecommendation, BackendError> {
        let request = GenerateContentRequest {
            contents: Self::single_content(vec![Part::text(prompt::recommendation_prompt(
                categories, weather,
            ))]),
            generation_config: Some(GenerationConfig::json(prompt::recommendation_schema(
                categories,
            ))),
        };

        let response = self.generate(&self.text_model, &request).await?;
        let text = joined_text(&response).ok_or_else(|| {
            BackendError::IncompleteResponse(
                "the model returned no text for the recommendation".to_string(),
            )
        })?;

        parse_recommendation(&text, categories)
    }
}

/// Validates the isolation exchange: exactly one image part and one text
/// part parseable as `{name, tags}`. Missing either, or a safety block,
/// fails the whole call — no partial success.
pub(crate) fn parse_isolation_response(
    response: &GenerateContentResponse,
) -> Result<IsolatedGarment, BackendError> {
    let parts = response.parts();
    if parts.len() < 2 {
        if let Some(categories) = response.blocked_categories() {
            return Err(BackendError::SafetyBlocked { categories });
        }
        return Err(BackendError::IncompleteResponse(
            "the model did not return a valid response during garment isolation".to_string(),
        ));
    }

    let mut image: Option<ImagePayload> = None;
    let mut metadata: Option<GarmentMetadata> = None;

    for part in parts {
        if let Some(inline) = part.inline_data.as_ref().filter(|_| part.is_image()) {
            // The isolation contract promises a transparent-background PNG.
            image = Some(ImagePayload::png(decode_inline(&inline.data)?));
        } else if let Some(text) = part.text.as_deref() {
            metadata = Some(parse_metadata(text)?);
        }
    }

    match (image, metadata) {
        (Some(image), Some(metadata)) => Ok(IsolatedGarment {
            image,
            name: metadata.name,
            tags: metadata
                .tags
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }),
        _ => Err(BackendError::IncompleteResponse(
            "the model response did not provide both a valid image and the required metadata"
                .to_string(),
        )),
    }
}

/// First image part of the response, decoded. `None` when the response
/// carried no image at all.
pub(crate) fn first_image(
    response: &GenerateContentResponse,
) -> Option<Result<ImagePayload, BackendError>> {
    let inline = response
        .parts()
        .iter()
        .find(|p| p.inline_data.is_some())
        .and_then(|p| p.inline_data.as_ref())?;

    let mime_type = if inline.mime_type.is_empty() {
        "image/png".to_string()
    } else {
        inline.mime_type.clone()
    };

    Some(decode_inline(&inline.data).map(|data| ImagePayload::new(data, mime_type)))
}

/// All text parts of the first candidate, concatenated.
pub(crate) fn joined_text(response: &GenerateContentResponse) -> Option<String> {
    let texts: Vec<&str> = response
        .parts()
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

fn decode_inline(data: &str) -> Result<Vec<u8>, BackendError> {
    STANDARD.decode(data.as_bytes()).map_err(|e| {
        BackendError::IncompleteResponse(format!("image part was not valid base64: {}", e))
    })
}

/// Parses the `{name, tags}` metadata text part. Models occasionally wrap
/// the object in markdown fences despite instructions; those are stripped
/// before parsing. A malformed object is terminal — no silent defaulting.
pub(crate) fn parse_metadata(text: &str) -> Result<GarmentMetadata, BackendError> {
    let cleaned = strip_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        BackendError::MetadataParse(format!("{}. Response was: {}", e, cleaned))
    })
}

/// Validates a recommendation text: parseable JSON, at least one item,
/// every item a known category drawn from the supplied set.
pub(crate) fn parse_recommendation(
    text: &str,
    allowed: &[Category],
) -> Result<OutfitRecommendation, BackendError> {
    let cleaned = strip_fences(text);
    let payload: RecommendationPayload = serde_json::from_str(&cleaned).map_err(|e| {
        BackendError::MetadataParse(format!("{}. Response was: {}", e, cleaned))
    })?;

    if payload.items.is_empty() {
        return Err(BackendError::EmptyRecommendation);
    }

    let mut items = Vec::with_capacity(payload.items.len());
    for raw in payload.items {
        let category = Category::parse(&raw)
            .filter(|c| allowed.contains(c))
            .ok_or(BackendError::UnknownCategory(raw))?;
        items.push(category);
    }

    Ok(OutfitRecommendation {
        outfit_name: payload.outfit_name,
        description: payload.description,
        items,
    })
}

fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
