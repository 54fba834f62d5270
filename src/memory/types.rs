use crate::catalog::ProductRecommendation;
use serde::{Deserialize, Serialize};

/// A named detection with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub score: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Analysis of one processed image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysisRecord {
    /// Human-readable summary built from labels, objects, and text
    pub description: String,
    pub labels: Vec<Label>,
    pub objects: Vec<Label>,
    /// First detected text block, possibly truncated
    pub text_content: String,
    pub potential_products: Vec<String>,
    pub timestamp: String,
    /// Free-form location tag supplied by the client
    pub location: String,
    pub session_id: String,
}

impl ImageAnalysisRecord {
    /// Names of labels followed by names of objects
    pub fn detection_names(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .chain(self.objects.iter())
            .map(|l| l.name.as_str())
    }
}

/// Items seen inside a storage area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLocationRecord {
    pub items: Vec<String>,
    /// Storage keyword detected in the image (fridge, drawer, ...)
    pub storage_location: String,
    pub location: String,
    pub timestamp: String,
    /// Id of the image-analysis record this was derived from
    pub image_ref: String,
}

/// Kind of logged interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Raw query, logged before routing
    Chat,
    /// Query and reply of a text chat turn
    ChatInteraction,
    /// Transcript and reply of a voice turn
    VoiceInteraction,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Chat => "chat",
            InteractionKind::ChatInteraction => "chat_interaction",
            InteractionKind::VoiceInteraction => "voice_interaction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chat" => Some(InteractionKind::Chat),
            "chat_interaction" => Some(InteractionKind::ChatInteraction),
            "voice_interaction" => Some(InteractionKind::VoiceInteraction),
            _ => None,
        }
    }
}

/// One logged chat or voice exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub kind: InteractionKind,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub product_recommendations: Vec<ProductRecommendation>,
    pub timestamp: String,
    pub session_id: String,
}

/// Result of locating an item in memory
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum ItemMatch {
    /// The item was recorded inside a storage area
    Storage(ItemLocationRecord),
    /// The item only appeared among an image's labels or objects
    SeenInImage { location: String, timestamp: String },
}

impl ItemMatch {
    pub fn timestamp(&self) -> &str {
        match self {
            ItemMatch::Storage(record) => &record.timestamp,
            ItemMatch::SeenInImage { timestamp, .. } => timestamp,
        }
    }
}
