//! Per-user memory of images, item locations, and interactions
//!
//! Records are append-only and read back newest first. The [`MemoryStore`]
//! trait is the persistence seam; [`MemoryRecall`] layers retries and the
//! fuzzy lookups on top of it.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, Utc};

pub mod recall;
pub mod sqlite;
pub mod types;

pub use recall::MemoryRecall;
pub use sqlite::SqliteMemoryStore;
pub use types::{
    ImageAnalysisRecord, InteractionKind, InteractionRecord, ItemLocationRecord, ItemMatch, Label,
};

/// Document store holding each user's memory records
///
/// Every read returns records ordered by timestamp descending, with
/// insertion order breaking ties.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist an image analysis and return its id
    async fn insert_image(&self, user_id: &str, record: &ImageAnalysisRecord) -> Result<String>;

    /// Persist an item-location record and return its id
    async fn insert_item_location(
        &self,
        user_id: &str,
        record: &ItemLocationRecord,
    ) -> Result<String>;

    /// Persist an interaction and return its id
    async fn insert_interaction(&self, user_id: &str, record: &InteractionRecord)
        -> Result<String>;

    /// Most recent image analyses
    async fn recent_images(&self, user_id: &str, limit: usize) -> Result<Vec<ImageAnalysisRecord>>;

    /// Most recent item-location records
    async fn recent_item_locations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ItemLocationRecord>>;

    /// Most recent item-location record whose items contain exactly `item`
    async fn latest_location_with_item(
        &self,
        user_id: &str,
        item: &str,
    ) -> Result<Option<ItemLocationRecord>>;

    /// Most recent image whose potential products contain exactly `product`
    async fn latest_image_with_product(
        &self,
        user_id: &str,
        product: &str,
    ) -> Result<Option<ImageAnalysisRecord>>;
}

/// Current time in the stored timestamp format
///
/// RFC 3339 UTC with microseconds, so that string order is time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Render a stored timestamp as "Weekday, Month DD at HH:MM AM" in local time
///
/// Falls back to "recently" when the timestamp cannot be parsed.
pub fn humanize_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%A, %B %d at %I:%M %p")
            .to_string(),
        Err(e) => {
            tracing::error!("Error formatting timestamp {:?}: {}", timestamp, e);
            "recently".to_string()
        }
    }
}
