//! Contextual answers to chat and voice queries

use super::AssistantState;
use crate::catalog::ProductRecommendation;
use crate::memory::{
    humanize_timestamp, now_timestamp, ImageAnalysisRecord, InteractionKind, InteractionRecord,
    ItemMatch,
};
use crate::router::{route, Intent};
use serde::Serialize;

const LOCATION_CLARIFICATION: &str =
    "I'm not sure what you're looking for. Can you please specify what item you're trying to find?";
const PRODUCT_CLARIFICATION: &str =
    "I'm not sure what product you're looking for. Can you be more specific about what you want to buy?";
const GENERAL_HELP: &str = "I'm here to help you find items and recommend products. You can ask me where you put something, or about products you've shown me in photos.";

/// Which memory, if any, an answer was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    ItemLocation,
    ProductRecommendation,
    RecentProductRecommendation,
    RecentImage,
    ObjectIdentification,
    ClarificationNeeded,
    NotFound,
    General,
}

/// The remembered record behind an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MemoryDetails {
    Item(ItemMatch),
    Image(Box<ImageAnalysisRecord>),
}

/// Which media accompany a reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MultimodalContent {
    pub has_audio: bool,
    pub has_image: bool,
    pub has_item_location: bool,
}

/// Reply to a chat or voice query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReply {
    pub response: String,
    pub memory_type: MemoryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_details: Option<MemoryDetails>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub product_recommendations: Vec<ProductRecommendation>,
    pub session_id: String,
    pub multimodal_content: MultimodalContent,
    pub audio_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_recognition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl QueryReply {
    fn new(response: impl Into<String>, memory_type: MemoryType, session_id: &str) -> Self {
        Self {
            response: response.into(),
            memory_type,
            memory_details: None,
            product_recommendations: Vec::new(),
            session_id: session_id.to_string(),
            multimodal_content: MultimodalContent::default(),
            audio_response: None,
            speech_recognition: None,
            confidence: None,
        }
    }

    fn with_details(mut self, details: MemoryDetails) -> Self {
        self.memory_details = Some(details);
        self
    }

    fn with_recommendations(mut self, recommendations: Vec<ProductRecommendation>) -> Self {
        self.multimodal_content.has_image = !recommendations.is_empty();
        self.product_recommendations = recommendations;
        self
    }

    /// Attach spoken audio, keeping `has_audio` in step
    pub fn attach_audio(&mut self, audio: Option<String>) {
        self.multimodal_content.has_audio = audio.is_some();
        self.audio_response = audio;
    }
}

/// Answer `query` from the user's memories
///
/// The raw query is logged before routing. Without a memory store every
/// lookup comes back empty and the reply says so.
pub async fn process_query(
    state: &AssistantState,
    query: &str,
    user_id: &str,
    session_id: &str,
) -> QueryReply {
    let memory = state.deps.memory.get();

    if let Some(recall) = memory {
        let record = InteractionRecord {
            kind: InteractionKind::Chat,
            query: query.to_string(),
            response: None,
            confidence: None,
            product_recommendations: Vec::new(),
            timestamp: now_timestamp(),
            session_id: session_id.to_string(),
        };
        recall.log_interaction(user_id, &record).await;
    }

    let routed = route(query);
    tracing::debug!("Routed query to {}", routed.intent);

    match routed.intent {
        Intent::Location => {
            let Some(item) = routed.argument else {
                return QueryReply::new(
                    LOCATION_CLARIFICATION,
                    MemoryType::ClarificationNeeded,
                    session_id,
                );
            };
            tracing::info!("Looking for item: '{}'", item);

            let found = match memory {
                Some(recall) => recall.find_item(user_id, &item).await,
                None => None,
            };
            match found {
                Some(found) => {
                    let when = humanize_timestamp(found.timestamp());
                    let response = match &found {
                        ItemMatch::Storage(record) => format!(
                            "Based on what I remember, you stored {} in the {} on {}.",
                            item, record.storage_location, when
                        ),
                        ItemMatch::SeenInImage { location, .. } => {
                            format!("I remember seeing {} at {} on {}.", item, location, when)
                        }
                    };
                    let mut reply = QueryReply::new(response, MemoryType::ItemLocation, session_id)
                        .with_details(MemoryDetails::Item(found));
                    reply.multimodal_content.has_item_location = true;
                    reply
                }
                None => {
                    tracing::info!("No memory found for item: {}", item);
                    QueryReply::new(
                        format!(
                            "I'm sorry, I don't remember where you put {}. Try uploading a photo the next time you store it.",
                            item
                        ),
                        MemoryType::NotFound,
                        session_id,
                    )
                }
            }
        }

        Intent::Product => {
            if let Some(product) = routed.argument {
                tracing::info!("Looking for product: '{}'", product);
                let seen = match memory {
                    Some(recall) => recall.find_product(user_id, &product).await,
                    None => None,
                };
                let recommendations = state.deps.catalog.recommendations(&product).await;
                if !recommendations.is_empty() {
                    let response = if seen.is_some() {
                        format!(
                            "I found some {} products that you might like. Here are some options you can buy online.",
                            product
                        )
                    } else {
                        format!(
                            "I don't recall you showing me {} before, but here are some products you might like.",
                            product
                        )
                    };
                    tracing::info!("Found {} product recommendations", recommendations.len());
                    return QueryReply::new(response, MemoryType::ProductRecommendation, session_id)
                        .with_recommendations(recommendations);
                }
            }

            let recent = match memory {
                Some(recall) => recall.recent_products(user_id).await,
                None => Vec::new(),
            };
            if let Some(product) = recent.first() {
                let recommendations = state.deps.catalog.recommendations(product).await;
                if !recommendations.is_empty() {
                    tracing::info!("Recommended recent product: {}", product);
                    return QueryReply::new(
                        format!(
                            "Based on your recent activity, I think you might be interested in {}. Here are some options.",
                            product
                        ),
                        MemoryType::RecentProductRecommendation,
                        session_id,
                    )
                    .with_recommendations(recommendations);
                }
            }

            QueryReply::new(
                PRODUCT_CLARIFICATION,
                MemoryType::ClarificationNeeded,
                session_id,
            )
        }

        Intent::Recall => match recent_image(state, user_id).await {
            Some(image) => QueryReply::new(
                format!("In your most recent image, {}", image.description),
                MemoryType::RecentImage,
                session_id,
            )
            .with_details(MemoryDetails::Image(Box::new(image))),
            None => QueryReply::new(
                "I don't have any recent image memories for you.",
                MemoryType::NotFound,
                session_id,
            ),
        },

        Intent::Identification => match recent_image(state, user_id).await {
            Some(image) => {
                let response = match image.potential_products.first() {
                    Some(product) => format!("This appears to be {}. {}", product, image.description),
                    None => image.description,
                };
                QueryReply::new(response, MemoryType::ObjectIdentification, session_id)
            }
            None => QueryReply::new(
                "I need to see an image first. Try uploading a photo of what you're looking at.",
                MemoryType::NotFound,
                session_id,
            ),
        },

        Intent::General => QueryReply::new(GENERAL_HELP, MemoryType::General, session_id),
    }
}

async fn recent_image(state: &AssistantState, user_id: &str) -> Option<ImageAnalysisRecord> {
    match state.deps.memory.get() {
        Some(recall) => recall.recent_image(user_id).await,
        None => None,
    }
}
