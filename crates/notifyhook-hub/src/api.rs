//! HTTP relay server: one authenticated endpoint in front of the dispatcher.
//!
//! Endpoints:
//! - `POST /` relays `{"message": ..., "channel"?: ...}`
//! - `GET /?action=channels` lists enabled channels
//! - `GET /health` is a health check (no auth)
//!
//! Anything else on `/` answers 405. Every request except `/health` must
//! carry the API key.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use tracing::info;

use notifyhook_core::config::RelayConfig;
use notifyhook_core::error::RelayError;
use notifyhook_core::message::{ChannelList, NotificationRequest};

use crate::dispatcher::Dispatcher;
use crate::middleware::{auth_middleware, logging_middleware};

/// Shared API state.
pub struct ApiState {
    pub dispatcher: Dispatcher,
    pub api_key: String,
}

impl ApiState {
    pub fn new(dispatcher: Dispatcher, api_key: impl Into<String>) -> Self {
        Self {
            dispatcher,
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> notifyhook_core::error::Result<Self> {
        Ok(Self::new(Dispatcher::from_config(config)?, config.api_key.clone()))
    }
}

type SharedState = Arc<ApiState>;

// ─── Errors ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// A request-level failure rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            e if e.is_request_level() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                success: false,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ─── Handlers ──────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn channels(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("action").map(String::as_str) != Some("channels") {
        return method_not_allowed().await;
    }
    Json(ChannelList {
        channels: state.dispatcher.enabled_channels(),
    })
    .into_response()
}

async fn notify(State(state): State<SharedState>, body: Bytes) -> Result<Response, ApiError> {
    let request = NotificationRequest::from_json_lossy(&body);
    let report = state.dispatcher.dispatch(&request).await?;

    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(report)).into_response())
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            success: false,
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response()
}

// ─── Server builder ────────────────────────────────────────

/// Build the API router.
pub fn build_router(state: SharedState) -> Router {
    let relay = Router::new()
        .route(
            "/",
            get(channels).post(notify).fallback(method_not_allowed),
        )
        .fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(relay)
        .layer(middleware::from_fn(logging_middleware))
}

/// Start the relay server and run until Ctrl-C.
pub async fn start_server(state: ApiState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
