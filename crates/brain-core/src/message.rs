//! Message types exchanged between the webhook layer and the agent.

use serde::{Deserialize, Serialize};

/// A direct message received from the platform, normalized from a webhook.
///
/// Created once per messaging event and discarded after the agent has
/// consumed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform-scoped id of the user who sent the message.
    pub sender_id: String,
    /// Id of the business account that received the message.
    pub recipient_id: String,
    /// Message text (never empty).
    pub text: String,
    /// Event timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Platform message id.
    pub message_id: String,
}

impl InboundMessage {
    /// Create a new inbound message.
    pub fn new(
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        text: impl Into<String>,
        timestamp_ms: i64,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            text: text.into(),
            timestamp_ms,
            message_id: message_id.into(),
        }
    }
}
