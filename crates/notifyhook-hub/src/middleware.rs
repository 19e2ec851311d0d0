//! API middleware: API key auth and request logging.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use notifyhook_core::auth::authenticate;
use notifyhook_core::error::RelayError;

use crate::api::{ApiError, ApiState};

/// The key a caller presented: `X-API-Key`, else `Authorization: Bearer`.
pub fn presented_key(headers: &HeaderMap) -> &str {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return key;
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// API key authentication middleware. Runs before routing, so a bad key
/// gets 401 whatever the method or path.
pub async fn auth_middleware(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !authenticate(presented_key(&headers), &state.api_key) {
        warn!("Rejected {} {}: bad or missing API key", request.method(), request.uri().path());
        return ApiError(RelayError::Unauthorized).into_response();
    }
    next.run(request).await
}

/// Request logging middleware.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} → {} ({:.1}ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}
