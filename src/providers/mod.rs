//! Collaborator abstractions and REST implementations
//!
//! Each cloud capability the gateways consume is a trait so handlers can be
//! exercised against in-memory fakes. The REST clients talk to Google Cloud
//! (vision, speech, text-to-speech), the generative language API, and any
//! OpenAI-compatible embeddings endpoint.

pub mod embeddings;
pub mod gemini;
pub mod google;

pub use embeddings::EmbeddingClient;
pub use gemini::GeminiClient;
pub use google::{GoogleRest, SpeechClient, TextToSpeechClient, VisionClient};

use crate::error::{MemoriaError, Result};
use crate::memory::Label;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Detections returned for one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnnotation {
    pub labels: Vec<Label>,
    pub objects: Vec<Label>,
    /// Full text of the first text annotation, if any
    pub text: Option<String>,
}

/// Image labelling, object localization, and text detection
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnnotation>;
}

/// Encoding of audio sent for recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoding {
    #[serde(rename = "LINEAR16")]
    Linear16,
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "FLAC")]
    Flac,
    #[serde(rename = "OGG_OPUS")]
    OggOpus,
}

/// Recognition parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub model: String,
    pub enable_automatic_punctuation: bool,
    pub audio_channel_count: u32,
}

impl RecognitionConfig {
    /// Short-command recognition of mono audio
    pub fn command(encoding: AudioEncoding, sample_rate_hertz: u32, language_code: &str) -> Self {
        Self {
            encoding,
            sample_rate_hertz,
            language_code: language_code.to_string(),
            model: "command_and_search".to_string(),
            enable_automatic_punctuation: true,
            audio_channel_count: 1,
        }
    }
}

/// Best alternative of the first recognition result
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
}

/// Speech-to-text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe `audio`; `Ok(None)` when no speech was detected
    async fn recognize(&self, audio: &[u8], config: &RecognitionConfig)
        -> Result<Option<Transcript>>;
}

/// Text-to-speech producing MP3 bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Generative language model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Answer `prompt` about an inline image
    async fn describe_image(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String>;

    /// Answer a text-only prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Text embedding
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Build the shared HTTP client used by REST collaborators
pub(crate) fn http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("memoria/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            MemoriaError::Collaborator(format!("Failed to create HTTP client: {}", e)).into()
        })
}

/// Send a prepared request and decode a JSON response
///
/// Non-success statuses become collaborator errors carrying the body text.
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("{} request failed: {}", service, e);
        MemoriaError::Collaborator(format!("{} request failed: {}", service, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("{} returned error {}: {}", service, status, error_text);
        return Err(MemoriaError::Collaborator(format!(
            "{} returned error {}: {}",
            service, status, error_text
        ))
        .into());
    }

    response.json().await.map_err(|e| {
        tracing::error!("Failed to parse {} response: {}", service, e);
        MemoriaError::Collaborator(format!("Failed to parse {} response: {}", service, e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_config_serializes_camel_case() {
        let config = RecognitionConfig::command(AudioEncoding::OggOpus, 16_000, "en-US");
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["encoding"], "OGG_OPUS");
        assert_eq!(value["sampleRateHertz"], 16_000);
        assert_eq!(value["languageCode"], "en-US");
        assert_eq!(value["model"], "command_and_search");
        assert_eq!(value["enableAutomaticPunctuation"], true);
        assert_eq!(value["audioChannelCount"], 1);
    }

    #[test]
    fn test_audio_encoding_names() {
        assert_eq!(
            serde_json::to_string(&AudioEncoding::Linear16).unwrap(),
            "\"LINEAR16\""
        );
        assert_eq!(serde_json::to_string(&AudioEncoding::Mp3).unwrap(), "\"MP3\"");
    }
}
