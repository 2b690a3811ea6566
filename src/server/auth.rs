// src/server/auth.rs

//! Bearer token check for the webhook endpoint.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::AppState;

/// Body of every 401 answer.
pub const UNAUTHORIZED_MESSAGE: &str = "Credentials are required to access this resource.";

const BEARER_PREFIX: &str = "Bearer ";

/// Reject requests whose bearer token differs from the configured one.
///
/// An empty configured token rejects everything.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    if state.token.is_empty() || presented != Some(state.token.as_str()) {
        log::warn!("Token does not match for {}", request.uri().path());
        return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE).into_response();
    }

    next.run(request).await
}
