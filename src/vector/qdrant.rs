use super::{VectorHit, VectorIndex};
use crate::config::VectorConfig;
use crate::error::{MemoriaError, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointId,
    PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Points fetched per scroll page when listing a user's entries
const SCROLL_PAGE: u32 = 256;

/// Description index backed by a Qdrant collection
///
/// Every point carries `user_id`, `entry_id` and `document` in its payload.
/// Point ids are derived from the entry id, so re-adding an entry replaces it.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorIndex {
    /// Connect to Qdrant and make sure the collection exists
    ///
    /// # Errors
    ///
    /// Returns an error when no URL is configured or Qdrant cannot be reached.
    pub async fn connect(config: &VectorConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MemoriaError::VectorIndex("No vector store URL configured".into()))?;
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| MemoriaError::VectorIndex(format!("Failed to create Qdrant client: {}", e)))?;

        let index = Self {
            client,
            collection: config.collection.clone(),
        };
        index.ensure_collection(config.dimension).await?;
        Ok(index)
    }

    async fn ensure_collection(&self, dimension: u64) -> Result<()> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| {
                MemoriaError::VectorIndex(format!("Failed to check collection existence: {}", e))
            })?;

        if exists {
            debug!("Collection {} already exists", self.collection);
            return Ok(());
        }

        info!("Creating collection: {}", self.collection);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
            )
            .await
            .map_err(|e| MemoriaError::VectorIndex(format!("Failed to create collection: {}", e)))?;
        Ok(())
    }
}

/// Stable point id for an entry id
pub fn point_id(entry_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, entry_id.as_bytes()).to_string()
}

fn user_filter(user_id: &str) -> Filter {
    Filter::must([Condition::matches("user_id", user_id.to_string())])
}

fn entry_payload(user_id: &str, entry_id: &str, document: &str) -> HashMap<String, Value> {
    [
        ("user_id".to_string(), Value::from(user_id.to_string())),
        ("entry_id".to_string(), Value::from(entry_id.to_string())),
        ("document".to_string(), Value::from(document.to_string())),
    ]
    .into_iter()
    .collect()
}

fn get_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Turn a scored point's payload into a hit; Qdrant reports cosine similarity
fn hit_from_payload(payload: &HashMap<String, Value>, score: f32) -> Option<VectorHit> {
    Some(VectorHit {
        id: get_string(payload, "entry_id")?,
        document: get_string(payload, "document")?,
        distance: 1.0 - score,
    })
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn add(&self, user_id: &str, id: &str, document: &str, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(MemoriaError::VectorIndex("Cannot store an empty embedding".into()).into());
        }

        let point = PointStruct::new(
            point_id(id),
            embedding.to_vec(),
            entry_payload(user_id, id, document),
        );
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| MemoriaError::VectorIndex(format!("Failed to upsert entry: {}", e)))?;

        debug!("Entry {} stored", id);
        Ok(())
    }

    async fn query(&self, user_id: &str, embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), limit as u64)
                    .filter(user_filter(user_id))
                    .with_payload(true),
            )
            .await
            .map_err(|e| MemoriaError::VectorIndex(format!("Failed to search entries: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| hit_from_payload(&point.payload, point.score))
            .collect())
    }

    async fn ids(&self, user_id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(&self.collection)
                .filter(user_filter(user_id))
                .limit(SCROLL_PAGE)
                .with_payload(true);
            if let Some(next) = offset.take() {
                request = request.offset(next);
            }

            let page = self
                .client
                .scroll(request)
                .await
                .map_err(|e| MemoriaError::VectorIndex(format!("Failed to scroll entries: {}", e)))?;

            ids.extend(
                page.result
                    .iter()
                    .filter_map(|point| get_string(&point.payload, "entry_id")),
            );

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let points: Vec<String> = ids.iter().map(|id| point_id(id)).collect();
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(points)
                    .wait(true),
            )
            .await
            .map_err(|e| MemoriaError::VectorIndex(format!("Failed to delete entries: {}", e)))?;

        // Qdrant does not report a count for deletes
        Ok(ids.len())
    }
}
