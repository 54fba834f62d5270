//! HTTP handlers of the retrieval gateway

use super::{answer_prompt, document_for, SharedState, DESCRIBE_PROMPT, QUERY_LIMIT};
use crate::error::ApiError;
use crate::media;
use crate::memory::now_timestamp;
use crate::retry::retry;
use crate::vector::entry_id;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    let deps = &state.deps;
    Json(json!({
        "status": "healthy",
        "service": "retrieval-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "generator": deps.generator.status(),
        "embedder": deps.embedder.status(),
        "vector_index": deps.index.status(),
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}

/// `POST /describe-image`
pub async fn describe_image(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let (image, user_id) = read_describe_form(multipart).await?;
    let (Some(image), Some(user_id)) = (image, user_id) else {
        return Err(ApiError::bad_request("Image and userId are required"));
    };

    let generator = state.deps.generator.require("Generator")?;
    let embedder = state.deps.embedder.require("Embedding")?;
    let index = state.deps.index.require("Vector index")?;

    let Some(mime_type) = media::sniff_image(&image) else {
        return Err(ApiError::bad_request(
            "Invalid image format. Please upload a valid image file.",
        ));
    };

    let description = retry(state.retry, "Image description", || {
        generator.describe_image(&image, mime_type, DESCRIBE_PROMPT)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Generator request failed: {}", e)))?;

    let embedding = retry(state.retry, "Description embedding", || {
        embedder.embed(&description)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Embedding request failed: {}", e)))?;

    let timestamp = now_timestamp();
    let record_id = entry_id(&user_id, &timestamp);
    let document = document_for(&timestamp, &description);

    retry(state.retry, "Vector index write", || {
        index.add(&user_id, &record_id, &document, &embedding)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Vector index write failed: {}", e)))?;

    tracing::info!("Stored description {}", record_id);
    Ok(Json(json!({
        "userId": user_id,
        "timestamp": timestamp,
        "description": description,
    })))
}

async fn read_describe_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(Option<Bytes>, Option<String>), ApiError> {
    let (mut image, mut user_id) = (None, None);
    let Ok(mut multipart) = multipart else {
        return Ok((image, user_id));
    };

    let read_error = |e: axum::extract::multipart::MultipartError| {
        ApiError::bad_request(format!("Error reading form: {}", e))
    };
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        match field.name() {
            Some("image") => image = Some(field.bytes().await.map_err(read_error)?),
            Some("userId") => user_id = Some(field.text().await.map_err(read_error)?),
            _ => {}
        }
    }
    Ok((image, user_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: Option<String>,
    pub user_id: Option<String>,
}

/// `POST /query`
pub async fn query(
    State(state): State<SharedState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body.ok().map(|Json(request)| request);
    let Some(QueryRequest {
        query: Some(query),
        user_id: Some(user_id),
    }) = request
    else {
        return Err(ApiError::bad_request("Query and userId are required"));
    };

    let generator = state.deps.generator.require("Generator")?;
    let embedder = state.deps.embedder.require("Embedding")?;
    let index = state.deps.index.require("Vector index")?;

    let embedding = retry(state.retry, "Query embedding", || embedder.embed(&query))
        .await
        .map_err(|e| ApiError::Upstream(format!("Embedding request failed: {}", e)))?;

    let hits = retry(state.retry, "Vector index query", || {
        index.query(&user_id, &embedding, QUERY_LIMIT)
    })
    .await
    .map_err(|e| ApiError::Upstream(format!("Vector index query failed: {}", e)))?;

    if hits.is_empty() {
        return Ok(Json(json!({ "response": "No relevant information found." })));
    }
    tracing::debug!("Answering from {} stored descriptions", hits.len());

    let prompt = answer_prompt(&query, hits.iter().map(|hit| hit.document.as_str()));
    let response = retry(state.retry, "Answer generation", || generator.generate(&prompt))
        .await
        .map_err(|e| ApiError::Upstream(format!("Generator request failed: {}", e)))?;

    Ok(Json(json!({
        "userId": user_id,
        "query": query,
        "response": response,
        "timestamp": now_timestamp(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearContextRequest {
    pub user_id: Option<String>,
}

/// `POST /clear-context`
pub async fn clear_context(
    State(state): State<SharedState>,
    body: Result<Json<ClearContextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Some(user_id) = body.ok().and_then(|Json(request)| request.user_id) else {
        return Err(ApiError::bad_request("UserId is required"));
    };
    let index = state.deps.index.require("Vector index")?;

    let ids = retry(state.retry, "Vector index listing", || index.ids(&user_id))
        .await
        .map_err(|e| ApiError::Upstream(format!("Vector index listing failed: {}", e)))?;

    if ids.is_empty() {
        return Ok(Json(json!({ "message": "No context found for this user." })));
    }

    let deleted = retry(state.retry, "Vector index delete", || index.delete(&ids))
        .await
        .map_err(|e| ApiError::Upstream(format!("Vector index delete failed: {}", e)))?;

    tracing::info!("Cleared {} entries for user {}", deleted, user_id);
    Ok(Json(json!({
        "message": format!("Cleared context for userId: {}", user_id),
        "deleted_entries": deleted,
    })))
}
