//! Google Cloud REST clients
//!
//! Vision (`images:annotate`), Speech-to-Text (`speech:recognize`), and
//! Text-to-Speech (`text:synthesize`), authenticated with an API key passed
//! as the `key` query parameter.

use super::{
    http_client, send_json, ImageAnnotation, ImageAnnotator, RecognitionConfig, SpeechRecognizer,
    SpeechSynthesizer, Transcript,
};
use crate::config::GoogleConfig;
use crate::error::{MemoriaError, Result};
use crate::memory::Label;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// HTTP client and API key shared by the Google clients
#[derive(Debug, Clone)]
pub struct GoogleRest {
    client: Client,
    api_key: String,
}

impl GoogleRest {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error when no API key can be resolved
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            MemoriaError::Config("No Google API key or credentials file configured".to_string())
        })?;
        Self::new(api_key, config.timeout_seconds)
    }

    pub fn new(api_key: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_key: api_key.into(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
        service: &str,
    ) -> Result<T> {
        tracing::debug!("Sending {} request to {}", service, url);
        let request = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body);
        send_json(request, service).await
    }
}

// --- Vision ---------------------------------------------------------------

const LABEL_LIMIT: u32 = 10;
const OBJECT_LIMIT: u32 = 10;
const TEXT_LIMIT: u32 = 5;

/// Vision API client
#[derive(Debug, Clone)]
pub struct VisionClient {
    rest: GoogleRest,
    base_url: String,
}

impl VisionClient {
    pub fn new(rest: GoogleRest, base_url: impl Into<String>) -> Self {
        Self {
            rest,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl ImageAnnotator for VisionClient {
    async fn annotate(&self, image: &[u8]) -> Result<ImageAnnotation> {
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": LABEL_LIMIT },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": OBJECT_LIMIT },
                    { "type": "TEXT_DETECTION", "maxResults": TEXT_LIMIT },
                ],
            }],
        });
        let url = format!("{}/v1/images:annotate", self.base_url);

        let batch: AnnotateBatchResponse = self.rest.post(&url, &body, "Vision API").await?;
        let response = batch.responses.into_iter().next().unwrap_or_default();

        if let Some(status) = response.error.filter(|s| !s.message.is_empty()) {
            return Err(
                MemoriaError::Collaborator(format!("Vision API error: {}", status.message)).into(),
            );
        }

        let text = response
            .text_annotations
            .into_iter()
            .next()
            .map(|t| t.description)
            .filter(|t| !t.is_empty());

        Ok(ImageAnnotation {
            labels: response
                .label_annotations
                .into_iter()
                .map(|l| Label::new(l.description, l.score))
                .collect(),
            objects: response
                .localized_object_annotations
                .into_iter()
                .map(|o| Label::new(o.name, o.score))
                .collect(),
            text,
        })
    }
}

// --- Speech-to-Text -------------------------------------------------------

/// Speech-to-Text API client
#[derive(Debug, Clone)]
pub struct SpeechClient {
    rest: GoogleRest,
    base_url: String,
}

impl SpeechClient {
    pub fn new(rest: GoogleRest, base_url: impl Into<String>) -> Self {
        Self {
            rest,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f32,
}

#[async_trait]
impl SpeechRecognizer for SpeechClient {
    async fn recognize(
        &self,
        audio: &[u8],
        config: &RecognitionConfig,
    ) -> Result<Option<Transcript>> {
        let body = json!({
            "config": config,
            "audio": { "content": STANDARD.encode(audio) },
        });
        let url = format!("{}/v1/speech:recognize", self.base_url);

        let response: RecognizeResponse = self.rest.post(&url, &body, "Speech API").await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .map(|alt| Transcript {
                text: alt.transcript,
                confidence: alt.confidence,
            }))
    }
}

// --- Text-to-Speech -------------------------------------------------------

/// Text-to-Speech API client with a fixed standard voice
#[derive(Debug, Clone)]
pub struct TextToSpeechClient {
    rest: GoogleRest,
    base_url: String,
    language_code: String,
}

impl TextToSpeechClient {
    pub fn new(rest: GoogleRest, base_url: impl Into<String>, language_code: &str) -> Self {
        Self {
            rest,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language_code: language_code.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
    volume_gain_db: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[async_trait]
impl SpeechSynthesizer for TextToSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let body = json!({
            "input": { "text": text },
            "voice": VoiceSelection {
                language_code: &self.language_code,
                name: "en-US-Standard-C",
                ssml_gender: "NEUTRAL",
            },
            "audioConfig": AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: 0.9,
                pitch: 0.0,
                volume_gain_db: 1.0,
            },
        });
        let url = format!("{}/v1/text:synthesize", self.base_url);

        let response: SynthesizeResponse =
            self.rest.post(&url, &body, "Text-to-Speech API").await?;
        STANDARD.decode(response.audio_content).map_err(|e| {
            MemoriaError::Collaborator(format!("Invalid audio content from Text-to-Speech: {}", e))
                .into()
        })
    }
}
