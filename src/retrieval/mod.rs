//! Retrieval gateway
//!
//! Stores generated image descriptions in a per-user vector index and
//! answers questions from the nearest stored descriptions.

pub mod handlers;

use crate::config::Config;
use crate::dependency::Dependency;
use crate::providers::{Embedder, TextGenerator};
use crate::retry::RetryPolicy;
use crate::vector::VectorIndex;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Nearest entries handed to the generator per query
pub const QUERY_LIMIT: usize = 10;

/// Instruction sent with every uploaded image
pub const DESCRIBE_PROMPT: &str = "You are Sherlock Holmes, a mind with great attention to detail. Describe this image in complete detail without missing anything.";

/// Collaborators of the retrieval gateway
#[derive(Clone, Default)]
pub struct RetrievalDeps {
    pub generator: Dependency<dyn TextGenerator>,
    pub embedder: Dependency<dyn Embedder>,
    pub index: Dependency<dyn VectorIndex>,
}

/// Shared state of the retrieval gateway
pub struct RetrievalState {
    pub config: Config,
    pub deps: RetrievalDeps,
    pub retry: RetryPolicy,
}

pub type SharedState = Arc<RetrievalState>;

impl RetrievalState {
    pub fn new(config: Config, deps: RetrievalDeps) -> Self {
        let retry = RetryPolicy::from(config.retry);
        Self {
            config,
            deps,
            retry,
        }
    }
}

/// Stored document text for a description
pub fn document_for(timestamp: &str, description: &str) -> String {
    format!("{} | {}", timestamp, description)
}

/// Generator prompt answering `query` from retrieved documents
pub fn answer_prompt<'a>(query: &str, documents: impl IntoIterator<Item = &'a str>) -> String {
    let mut prompt = format!(
        "Based on the following stored descriptions, provide a response to the query '{}':\n\n",
        query
    );
    for document in documents {
        prompt.push_str("- ");
        prompt.push_str(document);
        prompt.push_str("\n\n");
    }
    prompt
}

/// Build the retrieval router with all layers applied
pub fn router(state: SharedState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/describe-image", post(handlers::describe_image))
        .route("/query", post(handlers::query))
        .route("/clear-context", post(handlers::clear_context))
        .with_state(state);

    crate::server::with_common_layers(app, max_upload)
}
