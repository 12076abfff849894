//! Development-only endpoints.
//!
//! Registered in every environment; outside development they answer 403.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Window used by `/active-leads` when `hours` is absent.
pub const DEFAULT_ACTIVE_HOURS: i64 = 24;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest {
    user_id: Option<String>,
    message: Option<String>,
}

impl UserRequest {
    /// Lenient decode; an unreadable body counts as empty.
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActiveLeadsParams {
    pub hours: Option<i64>,
}

fn require_development(state: &AppState) -> Result<()> {
    if state.is_development() {
        Ok(())
    } else {
        Err(ServerError::DevelopmentOnly)
    }
}

/// Run the agent directly, bypassing the webhook and delivery.
pub async fn test_agent(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    require_development(&state)?;

    let request = UserRequest::from_body(&body);
    let (Some(user_id), Some(message)) = (request.user_id(), request.message()) else {
        return Err(ServerError::BadRequest(
            "userId e message são obrigatórios".to_string(),
        ));
    };

    let output = state.agent.process(user_id, message).await?;
    Ok(Json(json!({ "success": true, "output": output })))
}

/// Drop a user's session turns.
pub async fn clear_memory(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    require_development(&state)?;

    let request = UserRequest::from_body(&body);
    let Some(user_id) = request.user_id() else {
        return Err(ServerError::BadRequest("userId é obrigatório".to_string()));
    };

    state.agent.clear_memory(user_id).await;
    info!("Session memory cleared for {}", user_id);
    Ok(Json(json!({
        "success": true,
        "message": format!("Memória do usuário {} limpa", user_id),
    })))
}

/// Check the access token against the Graph API.
pub async fn validate_token(State(state): State<AppState>) -> Result<Response> {
    require_development(&state)?;

    let response = match state.graph.validate_token().await {
        Ok(valid) => Json(json!({
            "valid": valid,
            "message": if valid { "Token válido" } else { "Token inválido" },
        }))
        .into_response(),
        Err(e) => {
            error!("Token validation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "valid": false, "error": e.to_string() })),
            )
                .into_response()
        }
    };
    Ok(response)
}

/// List leads contacted within the last `hours`.
pub async fn active_leads(
    State(state): State<AppState>,
    Query(params): Query<ActiveLeadsParams>,
) -> Result<Json<Value>> {
    require_development(&state)?;

    let hours = params.hours.filter(|h| *h > 0).unwrap_or(DEFAULT_ACTIVE_HOURS);
    let leads = state.agent.profiles().active_leads(hours).await;
    Ok(Json(json!({
        "hours": hours,
        "count": leads.len(),
        "leads": leads,
    })))
}
