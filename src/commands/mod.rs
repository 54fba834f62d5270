/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `assistant`: serve the assistant gateway
- `retrieval`: serve the retrieval gateway
- `route`: classify a single query offline

Both servers build their collaborators once at startup. A collaborator that
cannot be set up is recorded as unavailable instead of aborting startup.
*/

use crate::config::Config;
use crate::dependency::Dependency;
use crate::error::{MemoriaError, Result};
use std::net::SocketAddr;
use std::sync::Arc;

fn listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{}:{}", host, port).parse().map_err(|e| {
        MemoriaError::Config(format!(
            "Invalid listen address {}:{}: {}",
            host, port, e
        ))
        .into()
    })
}

// Assistant gateway command
pub mod assistant {
    //! Builds the assistant's collaborators and serves its router.

    use super::*;
    use crate::assistant::{self, AssistantDeps, AssistantState};
    use crate::catalog::ProductCatalog;
    use crate::memory::{MemoryRecall, MemoryStore, SqliteMemoryStore};
    use crate::providers::{
        GoogleRest, ImageAnnotator, SpeechClient, SpeechRecognizer, SpeechSynthesizer,
        TextToSpeechClient, VisionClient,
    };
    use crate::retry::RetryPolicy;

    /// Build every assistant collaborator from configuration
    ///
    /// # Errors
    ///
    /// Returns an error only when the catalog HTTP client cannot be built.
    /// Missing credentials, an unset `storage.memory_db`, and unopenable
    /// stores mark the collaborator unavailable.
    pub fn build_deps(config: &Config) -> Result<AssistantDeps> {
        let memory = Dependency::from_result("Memory store", open_memory(config));

        let (annotator, recognizer, synthesizer) = match GoogleRest::from_config(&config.google) {
            Ok(rest) => {
                let google = &config.google;
                let annotator: Arc<dyn ImageAnnotator> =
                    Arc::new(VisionClient::new(rest.clone(), google.vision_base.clone()));
                let recognizer: Arc<dyn SpeechRecognizer> =
                    Arc::new(SpeechClient::new(rest.clone(), google.speech_base.clone()));
                let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(TextToSpeechClient::new(
                    rest,
                    google.tts_base.clone(),
                    &config.audio.language_code,
                ));
                tracing::info!("Google Cloud clients initialized");
                (
                    Dependency::from(annotator),
                    Dependency::from(recognizer),
                    Dependency::from(synthesizer),
                )
            }
            Err(e) => {
                tracing::warn!("Google Cloud clients unavailable: {}", e);
                (
                    Dependency::Unavailable,
                    Dependency::Unavailable,
                    Dependency::Unavailable,
                )
            }
        };

        Ok(AssistantDeps {
            memory,
            annotator,
            recognizer,
            synthesizer,
            catalog: ProductCatalog::new(config.catalog.clone())?,
        })
    }

    fn open_memory(config: &Config) -> Result<Arc<MemoryRecall>> {
        let path = config
            .storage
            .memory_db
            .clone()
            .ok_or_else(|| MemoriaError::Storage("No memory store configured".into()))?;
        let store = SqliteMemoryStore::new_with_path(path)?;
        tracing::debug!("Memory store at {}", store.path().display());
        let store: Arc<dyn MemoryStore> = Arc::new(store);
        Ok(Arc::new(MemoryRecall::new(
            store,
            RetryPolicy::from(config.retry),
            config.matcher.clone(),
        )))
    }

    /// Serve the assistant gateway until shutdown
    pub async fn run_assistant(config: Config) -> Result<()> {
        let addr = listen_addr(&config.server.host, config.server.port)?;
        if config.auth.api_key_required {
            tracing::info!("API key enforcement enabled");
        }

        let deps = build_deps(&config)?;
        let state = Arc::new(AssistantState::new(config, deps));
        crate::server::run(assistant::router(state), addr, "Assistant gateway").await
    }
}

// Retrieval gateway command
pub mod retrieval {
    //! Builds the retrieval collaborators and serves its router.

    use super::*;
    use crate::providers::{EmbeddingClient, Embedder, GeminiClient, TextGenerator};
    use crate::retrieval::{self, RetrievalDeps, RetrievalState};
    use crate::vector::{QdrantVectorIndex, VectorIndex};

    /// Build every retrieval collaborator from configuration
    ///
    /// The vector index is only connected when `vector.url` is set and
    /// Qdrant answers at startup.
    pub async fn build_deps(config: &Config) -> RetrievalDeps {
        let generator = GeminiClient::from_config(&config.generator)
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        let embedder = EmbeddingClient::from_config(&config.embedding)
            .map(|client| Arc::new(client) as Arc<dyn Embedder>);
        let index = QdrantVectorIndex::connect(&config.vector)
            .await
            .map(|index| Arc::new(index) as Arc<dyn VectorIndex>);

        RetrievalDeps {
            generator: Dependency::from_result("Generator", generator),
            embedder: Dependency::from_result("Embedder", embedder),
            index: Dependency::from_result("Vector index", index),
        }
    }

    /// Serve the retrieval gateway until shutdown
    pub async fn run_retrieval(config: Config) -> Result<()> {
        let addr = listen_addr(&config.server.host, config.server.retrieval_port)?;
        let deps = build_deps(&config).await;
        let state = Arc::new(RetrievalState::new(config, deps));
        crate::server::run(retrieval::router(state), addr, "Retrieval gateway").await
    }
}

// Offline routing command
pub mod route {
    //! Prints how a query would be routed without contacting anything.

    use super::*;
    use crate::router::{route, Route};

    /// Render a routing decision as text or pretty JSON
    pub fn render(routed: &Route, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(routed)?);
        }
        Ok(format!(
            "intent: {}\nargument: {}",
            routed.intent,
            routed.argument.as_deref().unwrap_or("(none)")
        ))
    }

    /// Classify `query` and print the result
    pub fn run_route(query: &str, json: bool) -> Result<()> {
        let routed = route(query);
        tracing::debug!("Routed {:?} to {}", query, routed.intent);
        println!("{}", render(&routed, json)?);
        Ok(())
    }
}
