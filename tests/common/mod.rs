use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use memoria::assistant::{AssistantDeps, AssistantState};
use memoria::catalog::ProductCatalog;
use memoria::config::Config;
use memoria::memory::{
    ImageAnalysisRecord, InteractionRecord, ItemLocationRecord, Label, MemoryRecall, MemoryStore,
    SqliteMemoryStore,
};
use memoria::providers::{
    Embedder, ImageAnnotation, ImageAnnotator, RecognitionConfig, SpeechRecognizer,
    SpeechSynthesizer, TextGenerator, Transcript,
};
use memoria::retrieval::{RetrievalDeps, RetrievalState};
use memoria::retry::RetryPolicy;
use memoria::vector::{VectorHit, VectorIndex};
use memoria::Dependency;

/// Magic bytes of a PNG file; enough for format sniffing
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// Configuration with no collaborators, stores, or network lookups
#[allow(dead_code)]
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.storage.memory_db = None;
    config.vector.url = None;
    config.google.api_key = None;
    config.google.credentials_file = None;
    config.generator.api_key = None;
    config.catalog.enabled = false;
    config.audio.converter = None;
    config
}

#[allow(dead_code)]
fn recall_over(store: Arc<dyn MemoryStore>) -> Arc<MemoryRecall> {
    Arc::new(MemoryRecall::new(
        store,
        RetryPolicy::default(),
        Default::default(),
    ))
}

#[allow(dead_code)]
pub fn create_temp_recall(dir: &TempDir) -> Arc<MemoryRecall> {
    let store = SqliteMemoryStore::new_with_path(dir.path().join("memory.db"))
        .expect("failed to create sqlite memory store with path");
    recall_over(Arc::new(store))
}

#[allow(dead_code)]
/// Memory store whose every call fails, counting attempts
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    fn fail<T>(&self) -> memoria::Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("memory database unreachable")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemoryStore for FailingStore {
    async fn insert_image(&self, _: &str, _: &ImageAnalysisRecord) -> memoria::Result<String> {
        self.fail()
    }
    async fn insert_item_location(
        &self,
        _: &str,
        _: &ItemLocationRecord,
    ) -> memoria::Result<String> {
        self.fail()
    }
    async fn insert_interaction(&self, _: &str, _: &InteractionRecord) -> memoria::Result<String> {
        self.fail()
    }
    async fn recent_images(&self, _: &str, _: usize) -> memoria::Result<Vec<ImageAnalysisRecord>> {
        self.fail()
    }
    async fn recent_item_locations(
        &self,
        _: &str,
        _: usize,
    ) -> memoria::Result<Vec<ItemLocationRecord>> {
        self.fail()
    }
    async fn latest_location_with_item(
        &self,
        _: &str,
        _: &str,
    ) -> memoria::Result<Option<ItemLocationRecord>> {
        self.fail()
    }
    async fn latest_image_with_product(
        &self,
        _: &str,
        _: &str,
    ) -> memoria::Result<Option<ImageAnalysisRecord>> {
        self.fail()
    }
}

/// Recall over a store that never answers
#[allow(dead_code)]
pub fn failing_recall(store: Arc<FailingStore>) -> Arc<MemoryRecall> {
    recall_over(store)
}

/// Annotator returning a fixed annotation and counting calls
#[derive(Default)]
pub struct FakeAnnotator {
    pub annotation: ImageAnnotation,
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeAnnotator {
    pub fn returning(labels: &[(&str, f32)], objects: &[(&str, f32)]) -> Self {
        Self {
            annotation: ImageAnnotation {
                labels: labels.iter().map(|(n, s)| Label::new(*n, *s)).collect(),
                objects: objects.iter().map(|(n, s)| Label::new(*n, *s)).collect(),
                text: None,
            },
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnnotator for FakeAnnotator {
    async fn annotate(&self, _image: &[u8]) -> memoria::Result<ImageAnnotation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("vision backend down");
        }
        Ok(self.annotation.clone())
    }
}

/// Recognizer returning a fixed transcript
pub struct FakeRecognizer {
    pub transcript: Option<Transcript>,
}

#[allow(dead_code)]
impl FakeRecognizer {
    pub fn hearing(text: &str) -> Self {
        Self {
            transcript: Some(Transcript {
                text: text.to_string(),
                confidence: 0.92,
            }),
        }
    }

    pub fn silent() -> Self {
        Self { transcript: None }
    }
}

#[async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn recognize(
        &self,
        _audio: &[u8],
        _config: &RecognitionConfig,
    ) -> memoria::Result<Option<Transcript>> {
        Ok(self.transcript.clone())
    }
}

/// Synthesizer producing a tiny fixed clip
pub struct FakeSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> memoria::Result<Vec<u8>> {
        Ok(b"ID3fake".to_vec())
    }
}

/// Generator echoing a fixed description and summarizing prompts
pub struct FakeGenerator {
    pub description: String,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn describe_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _prompt: &str,
    ) -> memoria::Result<String> {
        Ok(self.description.clone())
    }

    async fn generate(&self, prompt: &str) -> memoria::Result<String> {
        let lines = prompt.lines().filter(|l| l.contains(" | ")).count();
        Ok(format!("answered from {} descriptions", lines))
    }
}

/// Embedder mapping a few topic words onto fixed axes
pub struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> memoria::Result<Vec<f32>> {
        let text = text.to_lowercase();
        let axis = |word: &str| if text.contains(word) { 1.0 } else { 0.0 };
        Ok(vec![axis("kitchen"), axis("garage"), axis("garden"), 0.1])
    }
}

#[allow(dead_code)]
/// In-memory vector index ranking by cosine distance
#[derive(Default)]
pub struct FakeIndex {
    entries: Mutex<Vec<(String, String, String, Vec<f32>)>>,
}

#[allow(dead_code)]
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    1.0 - dot / (norm(a) * norm(b))
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn add(
        &self,
        user_id: &str,
        id: &str,
        document: &str,
        embedding: &[f32],
    ) -> memoria::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|(_, existing, _, _)| existing != id);
        entries.push((
            user_id.to_string(),
            id.to_string(),
            document.to_string(),
            embedding.to_vec(),
        ));
        Ok(())
    }

    async fn query(
        &self,
        user_id: &str,
        embedding: &[f32],
        limit: usize,
    ) -> memoria::Result<Vec<VectorHit>> {
        let entries = self.entries.lock().unwrap();
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .filter(|(owner, _, _, _)| owner == user_id)
            .map(|(_, id, document, stored)| VectorHit {
                id: id.clone(),
                document: document.clone(),
                distance: cosine_distance(embedding, stored),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn ids(&self, user_id: &str) -> memoria::Result<Vec<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|(owner, _, _, _)| owner == user_id)
            .map(|(_, id, _, _)| id.clone())
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> memoria::Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(_, id, _, _)| !ids.contains(id));
        Ok(before - entries.len())
    }
}

/// Assistant collaborators backed by fakes and a temporary memory store
#[allow(dead_code)]
pub fn assistant_deps(dir: &TempDir, annotator: FakeAnnotator, recognizer: FakeRecognizer) -> AssistantDeps {
    let config = offline_config();
    let annotator: Arc<dyn ImageAnnotator> = Arc::new(annotator);
    let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(recognizer);
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(FakeSynthesizer);
    AssistantDeps {
        memory: Dependency::from(create_temp_recall(dir)),
        annotator: Dependency::from(annotator),
        recognizer: Dependency::from(recognizer),
        synthesizer: Dependency::from(synthesizer),
        catalog: ProductCatalog::new(config.catalog).expect("failed to build catalog client"),
    }
}

#[allow(dead_code)]
pub fn assistant_router(config: Config, deps: AssistantDeps) -> axum::Router {
    memoria::assistant::router(Arc::new(AssistantState::new(config, deps)))
}

/// Retrieval collaborators backed by fakes and an in-memory vector index
#[allow(dead_code)]
pub fn retrieval_deps(description: &str) -> RetrievalDeps {
    let index = FakeIndex::default();
    let generator: Arc<dyn TextGenerator> = Arc::new(FakeGenerator {
        description: description.to_string(),
    });
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder);
    let index: Arc<dyn VectorIndex> = Arc::new(index);
    RetrievalDeps {
        generator: Dependency::from(generator),
        embedder: Dependency::from(embedder),
        index: Dependency::from(index),
    }
}

#[allow(dead_code)]
pub fn retrieval_router(config: Config, deps: RetrievalDeps) -> axum::Router {
    memoria::retrieval::router(Arc::new(RetrievalState::new(config, deps)))
}

/// One part of a multipart form
#[allow(dead_code)]
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

const BOUNDARY: &str = "memoria-test-boundary";

/// Build a multipart/form-data POST request
#[allow(dead_code)]
pub fn multipart_request(uri: &str, parts: &[Part<'_>], api_key: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(body)).expect("failed to build request")
}

/// Build a JSON POST request
#[allow(dead_code)]
pub fn json_request(uri: &str, body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Collect a response body as JSON
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
