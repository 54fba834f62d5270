//! Error types for Memoria
//!
//! This module defines the error types used throughout the gateways,
//! using `thiserror` for ergonomic error handling. HTTP-facing failures
//! are modelled separately by [`ApiError`], which knows how to render
//! itself as a JSON response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for Memoria operations
///
/// This enum encompasses the failure domains of both services:
/// configuration loading, collaborator calls, persistence, and
/// media handling.
#[derive(Error, Debug)]
pub enum MemoriaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A cloud collaborator (vision, speech, TTS, generator, embeddings) failed
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Document store errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Vector index errors
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Audio preparation errors (temporary files, conversion)
    #[error("Audio error: {0}")]
    Audio(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Memoria operations
///
/// Uses `anyhow::Error` so that context can be attached while
/// propagating, mirroring how the rest of the crate reports failures.
pub type Result<T> = anyhow::Result<T>;

/// Failure of an HTTP request handler
///
/// Each variant maps to one status code of the public contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400: missing or invalid client input
    #[error("{0}")]
    BadRequest(String),
    /// 401: missing or incorrect API key
    #[error("Unauthorized access")]
    Unauthorized,
    /// 503: collaborator was never initialized
    #[error("{0}")]
    Unavailable(String),
    /// 500: collaborator call failed after exhausting retries
    #[error("{0}")]
    Upstream(String),
    /// 500: unexpected failure inside a handler, rendered with an apology
    #[error("{error}")]
    Internal {
        /// Short machine-facing description
        error: String,
        /// User-facing apology text
        apology: String,
        /// Session the failing request belonged to
        session_id: String,
    },
}

impl ApiError {
    /// Build a 400 error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Build a 503 error for an unavailable collaborator
    pub fn unavailable(service: &str) -> Self {
        Self::Unavailable(format!("{} service unavailable", service))
    }

    /// HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Internal {
                error,
                apology,
                session_id,
            } => json!({
                "error": error,
                "response": apology,
                "text_response": apology,
                "session_id": session_id,
                "multimodal_content": { "has_audio": false, "has_image": false },
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
