//! Webhook payload parsing.
//!
//! Payloads that are malformed, come from another platform or carry no
//! text are a normal, frequent case (reads, reactions, attachments) and
//! produce "no message" rather than an error.

use brain_core::InboundMessage;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Literal `object` value of Instagram messaging webhooks.
pub const PLATFORM_OBJECT: &str = "instagram";

/// Top-level webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

/// One entry (one business account) of a webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    pub id: Option<String>,
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// A single messaging event.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Option<Participant>,
    pub recipient: Option<Participant>,
    pub timestamp: Option<i64>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    pub mid: Option<String>,
    pub text: Option<String>,
    /// Set on copies of messages the business account itself sent.
    #[serde(default)]
    pub is_echo: bool,
}

impl MessagingEvent {
    /// Normalize the event, or `None` if it carries no usable text.
    pub fn to_inbound(&self) -> Option<InboundMessage> {
        let message = self.message.as_ref()?;
        if message.is_echo {
            return None;
        }
        let text = message.text.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }

        Some(InboundMessage::new(
            &self.sender.as_ref()?.id,
            &self.recipient.as_ref()?.id,
            text,
            self.timestamp?,
            message.mid.as_deref()?,
        ))
    }
}

/// Whether a JSON body claims to come from the platform.
pub fn is_platform_payload(value: &Value) -> bool {
    value.get("object").and_then(Value::as_str) == Some(PLATFORM_OBJECT)
}

fn decode(value: &Value) -> Option<WebhookPayload> {
    if !is_platform_payload(value) {
        debug!("Ignoring webhook for object {:?}", value.get("object"));
        return None;
    }
    match WebhookPayload::deserialize(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!("Ignoring malformed webhook: {}", e);
            None
        }
    }
}

/// Parse the first entry's first messaging event.
///
/// Later entries and events are ignored; use [`parse_all`] to fan out.
pub fn parse(value: &Value) -> Option<InboundMessage> {
    let payload = decode(value)?;
    let event = payload.entry.first()?.messaging.first()?;
    event.to_inbound()
}

/// Parse every text-bearing event of every entry, in delivery order.
pub fn parse_all(value: &Value) -> Vec<InboundMessage> {
    let Some(payload) = decode(value) else {
        return Vec::new();
    };

    payload
        .entry
        .iter()
        .flat_map(|entry| entry.messaging.iter())
        .filter_map(MessagingEvent::to_inbound)
        .collect()
}

/// Parse raw body bytes; invalid JSON yields `None`.
pub fn parse_bytes(body: &[u8]) -> Option<InboundMessage> {
    let value: Value = serde_json::from_slice(body).ok()?;
    parse(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(sender: &str, mid: &str, text: Option<&str>) -> Value {
        let mut message = json!({ "mid": mid });
        if let Some(text) = text {
            message["text"] = json!(text);
        }
        json!({
            "sender": { "id": sender },
            "recipient": { "id": "17841400000000000" },
            "timestamp": 1_735_689_600_000_i64,
            "message": message
        })
    }

    fn payload(events: Vec<Value>) -> Value {
        json!({
            "object": "instagram",
            "entry": [{ "id": "17841400000000000", "time": 1_735_689_600_000_i64, "messaging": events }]
        })
    }

    #[test]
    fn test_parse_identity_fields() {
        let body = payload(vec![event("1789", "mid.abc", Some("Oi, tudo bem?"))]);

        let message = parse(&body).unwrap();
        assert_eq!(message.sender_id, "1789");
        assert_eq!(message.recipient_id, "17841400000000000");
        assert_eq!(message.message_id, "mid.abc");
        assert_eq!(message.text, "Oi, tudo bem?");
        assert_eq!(message.timestamp_ms, 1_735_689_600_000);
    }

    #[test]
    fn test_parse_wrong_object() {
        let mut body = payload(vec![event("1789", "mid.abc", Some("Oi"))]);
        body["object"] = json!("page");
        assert!(parse(&body).is_none());
        assert!(parse_all(&body).is_empty());
    }

    #[test]
    fn test_parse_without_text() {
        let body = payload(vec![event("1789", "mid.abc", None)]);
        assert!(parse(&body).is_none());

        let blank = payload(vec![event("1789", "mid.abc", Some("   "))]);
        assert!(parse(&blank).is_none());
    }

    #[test]
    fn test_parse_malformed_shapes() {
        assert!(parse(&json!({"object": "instagram"})).is_none());
        assert!(parse(&json!({"object": "instagram", "entry": []})).is_none());
        assert!(parse(&json!({"object": "instagram", "entry": "nope"})).is_none());
        assert!(parse(&json!({"object": "instagram", "entry": [{"messaging": []}]})).is_none());
        assert!(parse(&json!([1, 2, 3])).is_none());
        assert!(parse_bytes(b"not json").is_none());

        let mut missing_sender = event("1789", "mid.abc", Some("Oi"));
        missing_sender.as_object_mut().unwrap().remove("sender");
        assert!(parse(&payload(vec![missing_sender])).is_none());
    }

    #[test]
    fn test_parse_ignores_echoes() {
        let mut echo = event("17841400000000000", "mid.echo", Some("Fala!"));
        echo["message"]["is_echo"] = json!(true);
        assert!(parse(&payload(vec![echo])).is_none());
    }

    #[test]
    fn test_parse_takes_first_event_only() {
        let body = payload(vec![
            event("1", "mid.1", Some("primeira")),
            event("2", "mid.2", Some("segunda")),
        ]);

        assert_eq!(parse(&body).unwrap().message_id, "mid.1");
    }

    #[test]
    fn test_parse_all_fans_out() {
        let mut body = payload(vec![
            event("1", "mid.1", Some("primeira")),
            event("2", "mid.2", None),
            event("3", "mid.3", Some("terceira")),
        ]);
        body["entry"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "x", "messaging": [event("4", "mid.4", Some("quarta"))] }));

        let ids: Vec<_> = parse_all(&body).into_iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec!["mid.1", "mid.3", "mid.4"]);
    }

    #[test]
    fn test_parse_bytes() {
        let body = serde_json::to_vec(&payload(vec![event("1789", "mid.abc", Some("Oi"))])).unwrap();
        assert_eq!(parse_bytes(&body).unwrap().sender_id, "1789");
    }
}
