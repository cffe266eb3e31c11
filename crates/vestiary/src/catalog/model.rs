//! Core data model: garment records, the user reference photo, and the
//! transient recommendation/weather values exchanged with collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of clothing categories a garment can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tops,
    Bottoms,
    Shoes,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Tops,
        Category::Bottoms,
        Category::Shoes,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Shoes => "Shoes",
            Category::Accessories => "Accessories",
        }
    }

    /// Parses the exact category spelling used on the wire. Anything else,
    /// including case variants, is rejected — backend output is validated
    /// against this enumeration, never coerced.
    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "Tops" => Some(Category::Tops),
            "Bottoms" => Some(Category::Bottoms),
            "Shoes" => Some(Category::Shoes),
            "Accessories" => Some(Category::Accessories),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque encoded image together with its encoding.
///
/// This is the shape in which every image crosses a component boundary:
/// raw bytes plus a mime type. Persisted forms serialize the bytes as
/// base64 inside the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, "image/png")
    }

    pub fn is_png(&self) -> bool {
        self.mime_type == "image/png"
    }

    pub fn to_base64(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        STANDARD.encode(&self.data)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// An unsaved garment awaiting user confirmation.
///
/// Produced by the isolation stage and replaced wholesale on every edit;
/// it becomes a [`GarmentRecord`] only through `CatalogStore::add_item`.
#[derive(Debug, Clone)]
pub struct GarmentDraft {
    pub image: ImagePayload,
    pub category: Category,
    pub name: String,
    pub tags: Vec<String>,
}

impl GarmentDraft {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A persisted catalog entry. Immutable after creation; removed only by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentRecord {
    pub id: String,
    pub image: ImagePayload,
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The single user reference photo used for outfit composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPhoto {
    pub image: ImagePayload,
}

/// One outfit suggestion from the backend. Transient — recomputed per
/// request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitRecommendation {
    pub outfit_name: String,
    pub description: String,
    pub items: Vec<Category>,
}

/// Optional weather enrichment for a recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    pub temperature_f: i32,
    pub description: String,
    pub icon_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_accepts_exact_spelling_only() {
        assert_eq!(Category::parse("Tops"), Some(Category::Tops));
        assert_eq!(Category::parse("Accessories"), Some(Category::Accessories));
        assert_eq!(Category::parse("tops"), None);
        assert_eq!(Category::parse("Hats"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn category_serde_uses_display_spelling() {
        let json = serde_json::to_string(&Category::Bottoms).unwrap();
        assert_eq!(json, "\"Bottoms\"");
        let back: Category = serde_json::from_str("\"Shoes\"").unwrap();
        assert_eq!(back, Category::Shoes);
    }

    #[test]
    fn image_payload_round_trips_through_json_as_base64() {
        let payload = ImagePayload::png(vec![1, 2, 3, 255]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["mimeType"], "image/png");
        assert!(json["data"].is_string());

        let back: ImagePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn draft_edits_replace_wholesale() {
        let draft = GarmentDraft {
            image: ImagePayload::png(vec![0]),
            category: Category::Tops,
            name: "Shirt".to_string(),
            tags: vec!["blue".to_string()],
        };

        let edited = draft
            .clone()
            .with_name("Blue Shirt")
            .with_tags(vec!["blue".to_string(), "cotton".to_string()]);

        assert_eq!(edited.name, "Blue Shirt");
        assert_eq!(edited.tags.len(), 2);
        assert_eq!(draft.name, "Shirt");
    }
}
