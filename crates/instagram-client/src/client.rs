//! Graph API HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::types::{SendPayload, SendResponse};

/// One-shot message transport.
///
/// [`GraphClient`] is the production implementation; tests substitute fakes
/// to drive [`crate::Delivery`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message once, without retrying.
    async fn send(&self, recipient_id: &str, text: &str) -> Result<SendResponse, GraphError>;
}

/// Client for the Instagram Graph API messaging endpoint.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    config: GraphConfig,
}

impl GraphClient {
    /// Create a new client.
    pub fn new(config: GraphConfig) -> Result<Self, GraphError> {
        let http = Client::builder()
            .timeout(config.send_timeout)
            .build()
            .map_err(GraphError::Http)?;

        Ok(Self { http, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Check that the access token is accepted by the `me` endpoint.
    pub async fn validate_token(&self) -> Result<bool, GraphError> {
        let resp = self
            .http
            .get(self.config.me_url())
            .bearer_auth(&self.config.access_token)
            .timeout(self.config.validate_timeout)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            info!("Access token validated");
            Ok(true)
        } else {
            let body = resp.text().await.unwrap_or_default();
            error!("Access token rejected: HTTP {} {}", status.as_u16(), body);
            Ok(false)
        }
    }
}

#[async_trait]
impl Transport for GraphClient {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<SendResponse, GraphError> {
        let url = self.config.messages_url();
        debug!(
            "Sending message to {} ({} chars) via {}",
            recipient_id,
            text.chars().count(),
            url
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&SendPayload::text(recipient_id, text))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err = GraphError::from_status(status.as_u16(), body);
            error!(
                "Send to {} failed: HTTP {} ({}) body={}",
                recipient_id,
                status.as_u16(),
                err,
                err.body().unwrap_or_default()
            );
            return Err(err);
        }

        let mut sent = serde_json::from_str::<SendResponse>(&body).unwrap_or_else(|e| {
            warn!(
                "Send to {} accepted (HTTP {}) with unreadable body: {}",
                recipient_id,
                status.as_u16(),
                e
            );
            SendResponse::default()
        });
        if sent.recipient_id.is_empty() {
            sent.recipient_id = recipient_id.to_string();
        }
        info!(
            "Message {} delivered to {}",
            sent.message_id, sent.recipient_id
        );
        Ok(sent)
    }
}
