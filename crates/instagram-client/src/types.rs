//! Wire types for the Graph API messaging endpoint.

use serde::{Deserialize, Serialize};

/// Body of a `POST /me/messages` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendPayload {
    pub recipient: Recipient,
    pub message: MessageBody,
}

impl SendPayload {
    /// A plain text message to one recipient.
    pub fn text(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.into(),
            },
            message: MessageBody { text: text.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub text: String,
}

/// Successful send response.
///
/// Both ids are optional on the wire; an accepted send without them still
/// counts as delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub message_id: String,
}

/// Error envelope returned by the Graph API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_payload_shape() {
        let payload = SendPayload::text("1789", "Bora!");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"recipient": {"id": "1789"}, "message": {"text": "Bora!"}})
        );
    }
}
