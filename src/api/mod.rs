// HTTP surface: Bot API webhook, health checks, webhook registration and metrics.

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::bot::Dispatcher;
use crate::config::WEBHOOK_PATH;
use crate::metrics;
use crate::telegram::Update;

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Public webhook URL, when one is configured.
    pub webhook_url: Option<String>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, webhook_url: Option<String>) -> Self {
        Self {
            dispatcher,
            webhook_url,
        }
    }
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> axum::response::Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(WEBHOOK_PATH, post(webhook))
        .route("/set_webhook", get(set_webhook))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(json!({ "service": "kpop-quiz-bot", "ok": true }))
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Handle one update to completion and acknowledge it.
async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> StatusCode {
    let timer = metrics::WEBHOOK_DURATION_SECONDS.start_timer();
    state.dispatcher.handle_update(update).await;
    timer.observe_duration();
    StatusCode::OK
}

async fn set_webhook(State(state): State<AppState>) -> axum::response::Response {
    let Some(url) = state.webhook_url.as_deref() else {
        return json_error(StatusCode::SERVICE_UNAVAILABLE, "PUBLIC_URL is not configured");
    };
    match state.dispatcher.transport().set_webhook(url).await {
        Ok(ok) => {
            tracing::info!(url, ok, "Webhook registration requested");
            Json(json!({ "set_webhook": ok, "url": url })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to set webhook: {e}");
            json_error(StatusCode::BAD_GATEWAY, &e.to_string())
        }
    }
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}
