//! Serde shapes for the `generateContent` wire protocol.

use serde::{Deserialize, Serialize};

use crate::catalog::model::ImagePayload;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(payload: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: payload.mime_type.clone(),
                data: payload.to_base64(),
            }),
        }
    }

    pub fn is_image(&self) -> bool {
        self.inline_data
            .as_ref()
            .is_some_and(|d| d.mime_type.starts_with("image/"))
    }
}

/// Base64-encoded binary part.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationConfig {
    /// Config for the image models: interleaved image and text output.
    pub fn image_and_text() -> Self {
        Self {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            ..Self::default()
        }
    }

    /// Config for structured JSON output validated against a schema.
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, if the response carried any.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Comma-joined safety categories flagged as blocked, if any.
    pub fn blocked_categories(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let blocked: Vec<&str> = candidate
            .safety_ratings
            .iter()
            .filter(|r| r.blocked)
            .map(|r| r.category.as_str())
            .collect();
        if blocked.is_empty() {
            None
        } else {
            Some(blocked.join(", "))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRating {
    pub category: String,
    #[serde(default)]
    pub blocked: bool,
}

/// Structured text the isolation exchange must return alongside the image.
#[derive(Debug, Deserialize)]
pub struct GarmentMetadata {
    pub name: String,
    pub tags: Vec<String>,
}

/// Structured recommendation payload; items are validated against the
/// category enumeration after parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub outfit_name: String,
    pub description: String,
    #[serde(default)]
    pub items: Vec<String>,
}
