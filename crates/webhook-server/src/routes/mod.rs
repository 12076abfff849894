//! Route handlers for the webhook server.

pub mod dev;
pub mod health;
pub mod webhook;

use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Prefix of the platform and development endpoints.
pub const API_PREFIX: &str = "/api/instagram";

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    let api = Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        // Development only
        .route("/test-agent", post(dev::test_agent))
        .route("/clear-memory", post(dev::clear_memory))
        .route("/validate-token", get(dev::validate_token))
        .route("/active-leads", get(dev::active_leads));

    Router::new()
        .route("/health", get(health::health))
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

/// Build the complete application.
pub fn app(state: AppState) -> Router {
    router().with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not Found", "path": uri.path() })),
    )
}
