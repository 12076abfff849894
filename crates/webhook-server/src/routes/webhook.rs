//! Platform webhook endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use instagram_client::webhook::{is_platform_payload, parse_all};
use instagram_client::SIGNATURE_HEADER;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dispatch;
use crate::error::Result;
use crate::state::AppState;

/// Query parameters of the verification handshake.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode", alias = "mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", alias = "verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", alias = "challenge")]
    pub challenge: Option<String>,
}

/// Answer the subscription handshake.
pub async fn verify(State(state): State<AppState>, Query(params): Query<VerifyParams>) -> Response {
    let mode = params.mode.as_deref().unwrap_or_default();
    let token_matches = params.verify_token.as_deref() == Some(state.verify_token.as_str());

    if mode == "subscribe" && token_matches {
        info!("Webhook verified");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        warn!(
            "Webhook verification failed (mode: {}, token matches: {})",
            mode, token_matches
        );
        StatusCode::FORBIDDEN.into_response()
    }
}

/// Receive message events.
///
/// The signature is checked against the raw body before anything else.
/// Accepted payloads are acknowledged at once and processed in the
/// background.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|value| value.to_str().unwrap_or_default());
    state.verifier.check(Some(&body), signature)?;

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Webhook body is not JSON: {}", e);
            return Ok(StatusCode::NOT_FOUND);
        }
    };

    if !is_platform_payload(&payload) {
        warn!("Webhook is not from instagram (object: {})", payload["object"]);
        return Ok(StatusCode::NOT_FOUND);
    }

    let messages = parse_all(&payload);
    if messages.is_empty() {
        debug!("Webhook carried no text messages");
    } else {
        info!("Webhook received with {} message(s)", messages.len());
    }

    dispatch::spawn_all(&state, messages);
    Ok(StatusCode::OK)
}
