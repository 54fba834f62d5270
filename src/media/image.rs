use crate::providers::ImageAnnotation;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const SUMMARY_ITEMS: usize = 5;
const TEXT_SNIPPET_LIMIT: usize = 100;
const MAX_POTENTIAL_PRODUCTS: usize = 10;
const PRODUCT_SCORE_THRESHOLD: f32 = 0.7;

/// Label words that describe the picture rather than a thing in it
const SCENE_WORDS: &[&str] = &["scene", "room", "background", "photo", "image"];

/// Keywords that mark an image as showing a storage area
const STORAGE_AREAS: &[&str] = &[
    "refrigerator",
    "fridge",
    "cabinet",
    "drawer",
    "shelf",
    "table",
    "counter",
    "pantry",
    "cupboard",
    "closet",
    "box",
];

/// Decode a base64 image field sent by a form client
///
/// Form encoding turns `+` into spaces and some clients drop trailing
/// padding, so both are repaired before decoding.
pub fn decode_base64_image(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut fixed: String = data
        .trim()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    let remainder = fixed.len() % 4;
    if remainder != 0 {
        fixed.extend(std::iter::repeat('=').take(4 - remainder));
    }
    STANDARD.decode(fixed)
}

/// MIME type of a recognised image format
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    ::image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Check size bounds of decoded image bytes
///
/// Returns the client-facing message on failure.
pub fn validate_image_bytes(bytes: &[u8], max_bytes: usize, empty_message: &str) -> Result<(), String> {
    if bytes.is_empty() {
        return Err(empty_message.to_string());
    }
    if bytes.len() > max_bytes {
        return Err(format!(
            "Image too large (max {})",
            super::size_limit_label(max_bytes)
        ));
    }
    Ok(())
}

/// Description and text snippet derived from an annotation
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub description: String,
    /// Detected text, cut to 97 characters plus `...` when longer than 100
    pub text_content: String,
}

/// Build the natural-language description of an annotated image
pub fn describe_annotation(annotation: &ImageAnnotation) -> ImageSummary {
    let mut parts = Vec::new();

    if !annotation.labels.is_empty() {
        let names: Vec<&str> = annotation
            .labels
            .iter()
            .take(SUMMARY_ITEMS)
            .map(|l| l.name.as_str())
            .collect();
        parts.push(format!("I can see: {}", names.join(", ")));
    }

    if !annotation.objects.is_empty() {
        let names: Vec<&str> = annotation
            .objects
            .iter()
            .take(SUMMARY_ITEMS)
            .map(|o| o.name.as_str())
            .collect();
        parts.push(format!("I detected these objects: {}", names.join(", ")));
    }

    let mut text_content = annotation.text.clone().unwrap_or_default();
    if !text_content.is_empty() {
        if text_content.chars().count() > TEXT_SNIPPET_LIMIT {
            text_content = text_content
                .chars()
                .take(TEXT_SNIPPET_LIMIT - 3)
                .chain("...".chars())
                .collect();
        }
        parts.push(format!("I also found this text: \"{}\"", text_content));
    }

    let description = if parts.is_empty() {
        "I don't see anything significant in this image.".to_string()
    } else {
        parts.join(" ")
    };

    ImageSummary {
        description,
        text_content,
    }
}

/// Names worth remembering as products
///
/// Confident labels that do not describe the scene itself come first, then
/// confident objects. Duplicates keep their first position.
pub fn potential_products(annotation: &ImageAnnotation) -> Vec<String> {
    let labels = annotation.labels.iter().filter(|label| {
        let lower = label.name.to_lowercase();
        label.score > PRODUCT_SCORE_THRESHOLD && !SCENE_WORDS.iter().any(|w| lower.contains(w))
    });
    let objects = annotation
        .objects
        .iter()
        .filter(|object| object.score > PRODUCT_SCORE_THRESHOLD);

    let mut products: Vec<String> = Vec::new();
    for detection in labels.chain(objects) {
        if !products.contains(&detection.name) {
            products.push(detection.name.clone());
        }
    }
    products.truncate(MAX_POTENTIAL_PRODUCTS);
    products
}

/// First storage keyword found in object names, else in label names
pub fn detect_storage(annotation: &ImageAnnotation) -> Option<&'static str> {
    first_storage_area(annotation.objects.iter().map(|o| o.name.as_str()))
        .or_else(|| first_storage_area(annotation.labels.iter().map(|l| l.name.as_str())))
}

fn first_storage_area<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<&'static str> {
    names.find_map(|name| {
        let lower = name.to_lowercase();
        STORAGE_AREAS.iter().copied().find(|area| lower.contains(area))
    })
}
