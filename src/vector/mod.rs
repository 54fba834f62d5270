//! Vector index of image descriptions
//!
//! Entries are keyed `{user_id}_{timestamp}` and tagged with their owner;
//! every query and listing is scoped to one user.

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub mod qdrant;

pub use qdrant::QdrantVectorIndex;

/// A retrieved entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorHit {
    pub id: String,
    pub document: String,
    /// Cosine distance to the query (0 is identical)
    pub distance: f32,
}

/// Nearest-neighbour store of embedded documents
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace an entry owned by `user_id`
    async fn add(&self, user_id: &str, id: &str, document: &str, embedding: &[f32]) -> Result<()>;

    /// Up to `limit` of the user's entries, nearest first
    async fn query(&self, user_id: &str, embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>>;

    /// Ids of every entry owned by `user_id`
    async fn ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// Delete entries by id, returning how many were removed
    async fn delete(&self, ids: &[String]) -> Result<usize>;
}

/// Entry id for a description stored at `timestamp`
pub fn entry_id(user_id: &str, timestamp: &str) -> String {
    format!("{}_{}", user_id, timestamp)
}
