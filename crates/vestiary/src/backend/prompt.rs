//! Instruction builders for the four backend exchanges.

use crate::catalog::model::{Category, WeatherContext};

/// Instruction for the garment isolation exchange: isolate the garment in
/// the named category, strip background and body parts, and return both a
/// transparent PNG and a `{name, tags}` metadata object.
pub fn isolation_instruction(category: Category) -> String {
    format!(
        r#"**Role:** You are a Clothing Isolation Expert.

**Primary Objective:** Your ONLY job is to perfectly isolate a single clothing item from the user's image based on the provided category, remove the background, and return metadata about it.

**Category Provided by User:** '{category}'

---

**JOB 1: IMAGE PROCESSING (Strict Rules)**

*   **Isolate Garment:** Find the single clothing item that matches the user's category ('{category}') and create a tight crop around it.
*   **Remove Background:** The final image background MUST be 100% transparent.
*   **Remove Body Parts:** You MUST remove all human body parts (arms, legs, torso, etc.). The final image must contain ONLY the garment, as if on an invisible mannequin.
*   **CRITICAL NEGATIVE CONSTRAINT:** **DO NOT** generate any other objects. The output image **MUST NOT** contain animals, vehicles, scenery, abstract shapes, or any item that is not the specified piece of clothing. If you cannot isolate the clothing, return an error; do not invent an object.

---

**JOB 2: METADATA GENERATION**

*   **Name:** Create a descriptive, concise name for the item (e.g., "Classic White T-Shirt").
*   **Tags:** Generate a list of 3-5 relevant, lowercase tags (e.g., "white", "cotton", "casual").

---

**CRUCIAL OUTPUT INSTRUCTIONS**

*   Your response MUST have exactly two parts.
*   **Part 1:** The processed PNG image with the transparent background.
*   **Part 2:** A single, minified JSON object in the text part. The JSON must have this exact structure: `{{"name": "...", "tags": ["..."]}}`. Do not add any other text or markdown like ```json.
*   **Example JSON:** `{{"name":"Vintage Blue Denim Jacket","tags":["blue","denim","jacket","casual"]}}`"#,
    )
}

/// Instruction for the try-on composition exchange. The identity, pose,
/// background, and framing rules here are the contract callers may assume
/// holds on success.
pub fn composition_instruction() -> &'static str {
    r#"**Role:** You are an expert virtual stylist and photo editor.

**Task:** Create a photorealistic image of a person wearing a new outfit. You will be given one image of the person (the model) and one or more images of clothing items with transparent backgrounds.

**Input:**
- **Image 1:** The person (model).
- **Subsequent Images:** Clothing items (e.g., shirt, pants, shoes), to be layered in the order supplied.

**Strict Rules for Output Image:**
1.  **Preserve Identity:** The person's face, hair, body shape, and pose MUST remain identical to the original photo. Do not alter their appearance in any way.
2.  **Maintain Background:** The background of the original photo MUST be used in the final image without any changes or alterations.
3.  **Realistic Fit:** Dress the person in the provided clothing items. The clothes should fit naturally. Pay close attention to:
    *   **Draping:** How the fabric hangs and folds on the body.
    *   **Lighting & Shadows:** Ensure the lighting on the clothes matches the lighting in the original photo. Add realistic shadows where the clothes create them (e.g., under the collar, folds in the fabric).
    *   **Layering:** If multiple items are provided (e.g., shirt and jacket), layer them correctly in the order they were supplied.
4.  **Crucial - No Cropping:** The output image's dimensions, aspect ratio, and framing MUST be identical to the original person's photo. Do not zoom in or crop the image in any way. The entire person must be visible as they were in the original.
5.  **Final Output:** Generate a single, new, high-quality image showing the final result. Do not output any text."#
}

/// Instruction for the refinement exchange: apply exactly the requested
/// edit and preserve every other pixel.
pub fn refinement_instruction(instruction: &str) -> String {
    format!(
        r#"**Role:** You are a magic photo editor.

**Task:** You will receive an image and a text instruction. Your job is to apply the change described in the text to the image, and nothing else.

**Strict Rules:**
1.  **Minimal Change:** Only apply the specific edit requested in the prompt.
2.  **Preserve Everything Else:** The rest of the image, including the person, clothing, quality, and style, must remain IDENTICAL.
3.  **Seamless Integration:** The edit must be photorealistic and seamlessly integrated.

**User's Edit Request:** "{instruction}"

**Output:** Return only the newly edited image. Do not output any text."#,
    )
}

/// Prompt for the structured recommendation exchange. Weather context is
/// woven in when present; its absence never blocks the request.
pub fn recommendation_prompt(
    categories: &[Category],
    weather: Option<&WeatherContext>,
) -> String {
    let category_list = categories
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let weather_line = weather
        .map(|w| {
            format!(
                "The current weather is {}°F and {}.",
                w.temperature_f, w.description
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are a fashion expert. A user has the following types of clothes in their virtual closet: {category_list}.
{weather_line}

Create one stylish outfit combination that is appropriate for the current context.
- The outfit must use at least two different categories from the provided list.
- Describe the outfit, its style, and why it works.
- Specify which categories of items are needed for the outfit.

Respond ONLY with a JSON object that strictly follows the provided schema."#,
    )
}

/// JSON schema constraining the recommendation response to the supplied
/// categories.
pub fn recommendation_schema(categories: &[Category]) -> serde_json::Value {
    let allowed: Vec<&str> = categories.iter().map(Category::as_str).collect();
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "outfitName": {
                "type": "STRING",
                "description": "A catchy name for the outfit style."
            },
            "description": {
                "type": "STRING",
                "description": "A brief description of the outfit, its style, and what occasion it's for."
            },
            "items": {
                "type": "ARRAY",
                "description": "A list of clothing categories needed for this outfit.",
                "items": {
                    "type": "STRING",
                    "enum": allowed
                }
            }
        },
        "required": ["outfitName", "description", "items"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_instruction_names_the_category() {
        let prompt = isolation_instruction(Category::Shoes);
        assert!(prompt.contains("'Shoes'"));
        assert!(prompt.contains("exactly two parts"));
    }

    #[test]
    fn recommendation_prompt_lists_categories() {
        let prompt = recommendation_prompt(&[Category::Tops, Category::Bottoms], None);
        assert!(prompt.contains("Tops, Bottoms"));
        assert!(!prompt.contains("current weather"));
    }

    #[test]
    fn recommendation_prompt_includes_weather_when_present() {
        let weather = WeatherContext {
            temperature_f: 41,
            description: "Rain".to_string(),
            icon_id: "10d".to_string(),
        };
        let prompt = recommendation_prompt(&[Category::Tops, Category::Shoes], Some(&weather));
        assert!(prompt.contains("41°F"));
        assert!(prompt.contains("Rain"));
    }

    #[test]
    fn recommendation_schema_constrains_items_to_supplied_set() {
        let schema = recommendation_schema(&[Category::Tops, Category::Shoes]);
        assert_eq!(
            schema["properties"]["items"]["items"]["enum"],
            serde_json::json!(["Tops", "Shoes"])
        );
    }
}
