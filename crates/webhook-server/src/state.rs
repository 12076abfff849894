//! Application state shared across handlers.

use std::sync::Arc;

use instagram_client::{Delivery, GraphClient, SignatureVerifier};
use orchestrator::Agent;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Conversation agent.
    pub agent: Arc<Agent>,
    /// Outbound sender with retry.
    pub delivery: Delivery,
    /// Graph API client, used for token validation.
    pub graph: Arc<GraphClient>,
    /// Inbound webhook signature verifier.
    pub verifier: SignatureVerifier,
    /// Token expected during webhook verification.
    pub verify_token: String,
    /// Deployment environment.
    pub environment: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        agent: Arc<Agent>,
        delivery: Delivery,
        graph: Arc<GraphClient>,
        verifier: SignatureVerifier,
        verify_token: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            delivery,
            graph,
            verifier,
            verify_token: verify_token.into(),
            environment: environment.into(),
        }
    }

    /// Whether development-only endpoints are enabled.
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
