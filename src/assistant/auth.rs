//! `X-API-Key` enforcement

use super::SharedState;
use crate::error::ApiError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject requests without the configured key when enforcement is on
pub async fn require_api_key(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let auth = &state.config.auth;
    if !auth.api_key_required {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == auth.api_key);

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!(
            "Rejected request to {}: bad or missing API key",
            request.uri().path()
        );
        ApiError::Unauthorized.into_response()
    }
}
