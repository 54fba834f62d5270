//! HTTP handlers of the assistant gateway

use super::query::{process_query, QueryReply};
use super::SharedState;
use crate::error::ApiError;
use crate::media::{self, ImageSummary};
use crate::memory::{
    now_timestamp, ImageAnalysisRecord, InteractionKind, InteractionRecord, ItemLocationRecord,
};
use crate::providers::RecognitionConfig;
use crate::retry::retry;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};

const DEFAULT_USER: &str = "anonymous";
const DEFAULT_LOCATION: &str = "unknown";

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    let deps = &state.deps;
    Json(json!({
        "status": "healthy",
        "service": "ai-context-assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "memory_store": deps.memory.status(),
        "vision_api": deps.annotator.status(),
        "speech_api": deps.recognizer.status(),
        "tts_api": deps.synthesizer.status(),
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}

/// A file part of a multipart upload
struct Upload {
    file_name: String,
    data: Bytes,
}

/// Fields of an image or voice upload form
#[derive(Default)]
struct UploadForm {
    image: Option<Upload>,
    image_base64: Option<String>,
    audio: Option<Upload>,
    user_id: Option<String>,
    session_id: Option<String>,
    location: Option<String>,
}

impl UploadForm {
    /// Collect the known fields; a body that is not multipart yields an empty form
    async fn read(
        multipart: Result<Multipart, MultipartRejection>,
        error_prefix: &str,
    ) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();
        let Ok(mut multipart) = multipart else {
            return Ok(form);
        };

        let read_error = |e: axum::extract::multipart::MultipartError| {
            ApiError::bad_request(format!("{}: {}", error_prefix, e))
        };

        while let Some(field) = multipart.next_field().await.map_err(read_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" | "audio" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(read_error)?;
                    let upload = Some(Upload { file_name, data });
                    if name == "image" {
                        form.image = upload;
                    } else {
                        form.audio = upload;
                    }
                }
                "image_base64" => form.image_base64 = Some(field.text().await.map_err(read_error)?),
                "user_id" => form.user_id = Some(field.text().await.map_err(read_error)?),
                "session_id" => form.session_id = Some(field.text().await.map_err(read_error)?),
                "location" => form.location = Some(field.text().await.map_err(read_error)?),
                other => tracing::debug!("Ignoring form field {:?}", other),
            }
        }
        Ok(form)
    }
}

/// Media flags of an image reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMultimodalContent {
    pub has_audio: bool,
    pub has_image: bool,
    pub has_item_location: bool,
    /// Storage keyword, set only when the item location was remembered
    pub storage_location: Option<String>,
}

/// Reply to an image upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReply {
    /// Id of the stored image analysis, if it was stored
    pub memory_id: Option<String>,
    pub description: String,
    pub text_response: String,
    pub audio_response: Option<String>,
    pub potential_products: Vec<String>,
    pub session_id: String,
    pub multimodal_content: ImageMultimodalContent,
}

/// `POST /api/process-image`
pub async fn process_image(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageReply>, ApiError> {
    let form = UploadForm::read(multipart, "Error reading image").await?;
    if form.image.is_none() && form.image_base64.is_none() {
        return Err(ApiError::bad_request("No image provided"));
    }
    let annotator = state.deps.annotator.require("Vision API")?;

    let user_id = form.user_id.unwrap_or_else(|| DEFAULT_USER.to_string());
    let session_id = form.session_id.unwrap_or_else(new_session_id);
    let location = form.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let max_bytes = state.config.server.max_upload_bytes;

    let content: Vec<u8> = match (form.image, form.image_base64) {
        (Some(upload), _) => {
            if upload.file_name.is_empty() {
                return Err(ApiError::bad_request("Empty image filename"));
            }
            media::validate_image_bytes(&upload.data, max_bytes, "Empty image file")
                .map_err(ApiError::BadRequest)?;
            upload.data.to_vec()
        }
        (None, Some(encoded)) => {
            let decoded = media::decode_base64_image(&encoded).map_err(|e| {
                ApiError::bad_request(format!("Invalid base64 image data: {}", e))
            })?;
            media::validate_image_bytes(&decoded, max_bytes, "Empty base64 image data")
                .map_err(ApiError::BadRequest)?;
            decoded
        }
        (None, None) => return Err(ApiError::bad_request("No image provided")),
    };

    if media::sniff_image(&content).is_none() {
        return Err(ApiError::bad_request(
            "Invalid image format. Please upload a valid image file.",
        ));
    }

    let annotation = retry(state.retry, "Vision API request", || {
        annotator.annotate(&content)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Vision API request failed: {}", e)))?;

    let ImageSummary {
        description,
        text_content,
    } = media::describe_annotation(&annotation);
    let potential_products = media::potential_products(&annotation);
    let timestamp = now_timestamp();

    let recall = state.deps.memory.get();
    let memory_id = match recall {
        Some(recall) => {
            let record = ImageAnalysisRecord {
                description: description.clone(),
                labels: annotation.labels.clone(),
                objects: annotation.objects.clone(),
                text_content,
                potential_products: potential_products.clone(),
                timestamp: timestamp.clone(),
                location: location.clone(),
                session_id: session_id.clone(),
            };
            recall.remember_image(&user_id, &record).await
        }
        None => None,
    };

    let mut storage_location = None;
    let detected = media::detect_storage(&annotation);
    let text_response = match (detected, recall, &memory_id) {
        (Some(area), Some(recall), Some(image_ref)) if !potential_products.is_empty() => {
            let record = ItemLocationRecord {
                items: potential_products.clone(),
                storage_location: area.to_string(),
                location,
                timestamp,
                image_ref: image_ref.clone(),
            };
            if recall
                .remember_item_location(&user_id, &record)
                .await
                .is_some()
            {
                storage_location = Some(area.to_string());
            }
            let shown: Vec<&str> = potential_products
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            format!(
                "I see you're storing {} in the {}. I'll remember this for you.",
                shown.join(", "),
                area
            )
        }
        _ => format!("I've analyzed this image. {}", description),
    };

    let audio_response = state.speak(&text_response).await;

    let reply = ImageReply {
        memory_id,
        description,
        multimodal_content: ImageMultimodalContent {
            has_audio: audio_response.is_some(),
            has_image: false,
            has_item_location: storage_location.is_some(),
            storage_location,
        },
        text_response,
        audio_response,
        potential_products,
        session_id,
    };

    tracing::info!("Image processing complete for session {}", reply.session_id);
    Ok(Json(reply))
}

/// `POST /api/process-voice`
pub async fn process_voice(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let recognizer = state.deps.recognizer.require("Speech API")?;

    let form = UploadForm::read(multipart, "Error reading audio").await?;
    let Some(upload) = form.audio else {
        return Err(ApiError::bad_request("No audio provided"));
    };
    let user_id = form.user_id.unwrap_or_else(|| DEFAULT_USER.to_string());
    let session_id = form.session_id.unwrap_or_else(new_session_id);
    let max_bytes = state.config.server.max_upload_bytes;

    if upload.file_name.is_empty() {
        return Err(ApiError::bad_request("Empty audio filename"));
    }
    if upload.data.is_empty() {
        return Err(ApiError::bad_request("Empty audio file"));
    }
    if upload.data.len() > max_bytes {
        return Err(ApiError::bad_request(format!(
            "Audio file too large (max {})",
            media::size_limit_label(max_bytes)
        )));
    }

    let prepared = media::prepare_audio(&upload.data, &upload.file_name, &state.config.audio)
        .await
        .map_err(|e| {
            internal_error(
                "Internal server error processing voice",
                "Sorry, I encountered an error processing your voice input. Could you try again?",
                &session_id,
                e,
            )
        })?;
    let recognition = RecognitionConfig::command(
        prepared.encoding,
        prepared.sample_rate_hertz,
        &state.config.audio.language_code,
    );

    let transcript = retry(state.retry, "Speech API request", || {
        recognizer.recognize(&prepared.content, &recognition)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Speech API request failed: {}", e)))?;

    let Some(transcript) = transcript else {
        tracing::warn!("No speech detected in audio");
        let message = "I couldn't hear anything. Could you please speak again?";
        return Ok(Json(json!({
            "response": message,
            "text_response": message,
            "error": "No speech detected",
            "session_id": session_id,
            "multimodal_content": { "has_audio": false, "has_image": false },
        }))
        .into_response());
    };
    tracing::info!(
        "Transcribed: '{}' with confidence {}",
        transcript.text,
        transcript.confidence
    );

    let mut reply = process_query(&state, &transcript.text, &user_id, &session_id).await;
    let audio = state.speak(&reply.response).await;
    reply.attach_audio(audio);
    reply.speech_recognition = Some(transcript.text.clone());
    reply.confidence = Some(transcript.confidence);

    if let Some(recall) = state.deps.memory.get() {
        let record = InteractionRecord {
            kind: InteractionKind::VoiceInteraction,
            query: transcript.text,
            response: Some(reply.response.clone()),
            confidence: Some(transcript.confidence),
            product_recommendations: Vec::new(),
            timestamp: now_timestamp(),
            session_id: session_id.clone(),
        };
        recall.log_interaction(&user_id, &record).await;
    }

    tracing::info!("Voice processing complete for session {}", session_id);
    Ok(Json(reply).into_response())
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<QueryReply>, ApiError> {
    let Ok(Json(body)) = body else {
        return Err(ApiError::bad_request("No query provided"));
    };
    let query = match body.get("query") {
        None => return Err(ApiError::bad_request("No query provided")),
        Some(Value::String(q)) if !q.trim().is_empty() => q.clone(),
        Some(_) => {
            return Err(ApiError::bad_request(
                "Invalid query: must be a non-empty string",
            ))
        }
    };
    let user_id = body
        .get("user_id")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_USER)
        .to_string();
    let session_id = body
        .get("session_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(new_session_id);

    tracing::info!(
        "Processing chat query: '{}' for user {}, session {}",
        query,
        user_id,
        session_id
    );

    let mut reply = process_query(&state, &query, &user_id, &session_id).await;
    let audio = state.speak(&reply.response).await;
    reply.attach_audio(audio);

    if let Some(recall) = state.deps.memory.get() {
        let record = InteractionRecord {
            kind: InteractionKind::ChatInteraction,
            query,
            response: Some(reply.response.clone()),
            confidence: None,
            product_recommendations: reply.product_recommendations.clone(),
            timestamp: now_timestamp(),
            session_id: session_id.clone(),
        };
        recall.log_interaction(&user_id, &record).await;
    }

    tracing::info!("Chat processing complete for session {}", session_id);
    Ok(Json(reply))
}

fn internal_error(
    error: &str,
    apology: &str,
    session_id: &str,
    cause: impl std::fmt::Display,
) -> ApiError {
    tracing::error!("{}: {}", error, cause);
    ApiError::Internal {
        error: error.to_string(),
        apology: apology.to_string(),
        session_id: session_id.to_string(),
    }
}
