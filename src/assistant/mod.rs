//! Assistant gateway
//!
//! Accepts images, voice recordings, and text chat, consults the cloud
//! collaborators, remembers what it saw, and answers with text plus an
//! optional spoken rendering.
//!
//! # Endpoints
//!
//! | Method | Path                  | Auth    |
//! |--------|-----------------------|---------|
//! | GET    | `/health`             | none    |
//! | GET    | `/api/health`         | none    |
//! | POST   | `/api/process-image`  | API key |
//! | POST   | `/api/process-voice`  | API key |
//! | POST   | `/api/chat`           | API key |

pub mod auth;
pub mod handlers;
pub mod query;

pub use query::{process_query, MemoryDetails, MemoryType, MultimodalContent, QueryReply};

use crate::catalog::ProductCatalog;
use crate::config::Config;
use crate::dependency::Dependency;
use crate::memory::MemoryRecall;
use crate::providers::{ImageAnnotator, SpeechRecognizer, SpeechSynthesizer};
use crate::retry::{retry, RetryPolicy};
use axum::routing::{get, post};
use axum::{middleware, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

/// Longest text sent to speech synthesis before truncation
const TTS_TEXT_LIMIT: usize = 4500;

/// Collaborators of the assistant gateway
#[derive(Clone)]
pub struct AssistantDeps {
    pub memory: Dependency<MemoryRecall>,
    pub annotator: Dependency<dyn ImageAnnotator>,
    pub recognizer: Dependency<dyn SpeechRecognizer>,
    pub synthesizer: Dependency<dyn SpeechSynthesizer>,
    pub catalog: ProductCatalog,
}

/// Shared state of the assistant gateway
pub struct AssistantState {
    pub config: Config,
    pub deps: AssistantDeps,
    pub retry: RetryPolicy,
}

pub type SharedState = Arc<AssistantState>;

impl AssistantState {
    pub fn new(config: Config, deps: AssistantDeps) -> Self {
        let retry = RetryPolicy::from(config.retry);
        Self {
            config,
            deps,
            retry,
        }
    }

    /// Synthesize `text` and return base64 MP3
    ///
    /// Returns `None` when synthesis is unavailable, the text is empty, or
    /// every attempt failed.
    pub async fn speak(&self, text: &str) -> Option<String> {
        let Some(synthesizer) = self.deps.synthesizer.get() else {
            tracing::warn!("Text-to-Speech client not available");
            return None;
        };
        if text.is_empty() {
            return None;
        }

        let text = truncate_for_speech(text);
        match retry(self.retry, "TTS API request", || synthesizer.synthesize(&text)).await {
            Ok(audio) => {
                let encoded = STANDARD.encode(audio);
                tracing::info!("Generated audio response ({} bytes)", encoded.len());
                Some(encoded)
            }
            Err(e) => {
                tracing::error!("Error generating speech: {}", e);
                None
            }
        }
    }
}

fn truncate_for_speech(text: &str) -> String {
    if text.chars().count() > TTS_TEXT_LIMIT {
        let mut cut: String = text.chars().take(TTS_TEXT_LIMIT).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Build the assistant router with all layers applied
pub fn router(state: SharedState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;

    let protected = Router::new()
        .route("/api/process-image", post(handlers::process_image))
        .route("/api/process-voice", post(handlers::process_voice))
        .route("/api/chat", post(handlers::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))
        .merge(protected)
        .with_state(state);

    crate::server::with_common_layers(app, max_upload)
}
