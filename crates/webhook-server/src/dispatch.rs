//! Background processing of inbound messages.
//!
//! The webhook acknowledges immediately; each message is then handled on
//! its own task. Failures are logged and never reach the platform.

use orchestrator::InboundMessage;
use tracing::{debug, error, info};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Spawn one processing task per message.
pub fn spawn_all(state: &AppState, messages: Vec<InboundMessage>) {
    for message in messages {
        let state = state.clone();
        tokio::spawn(async move {
            let sender = message.sender_id.clone();
            let message_id = message.message_id.clone();
            if let Err(e) = handle(&state, message).await {
                log_failure(&sender, &message_id, &e);
            }
        });
    }
}

/// Run the agent on one message and deliver its reply.
pub async fn handle(state: &AppState, message: InboundMessage) -> Result<()> {
    info!(
        "Processing message {} from {} ({} chars)",
        message.message_id,
        message.sender_id,
        message.text.chars().count()
    );
    debug!("Message {} text: {}", message.message_id, message.text);

    let output = state.agent.process_message(&message).await?;
    let sent = state
        .delivery
        .send_with_retry(&message.sender_id, &output.response_message)
        .await?;

    info!(
        "Reply {} delivered to {} (stage: {})",
        sent.message_id, sent.recipient_id, output.funnel_stage
    );
    Ok(())
}

fn log_failure(sender: &str, message_id: &str, err: &ServerError) {
    match err {
        ServerError::Graph(graph) => error!(
            "Failed to deliver reply to {} for message {}: {} (status: {:?}, body: {})",
            sender,
            message_id,
            graph,
            graph.status(),
            graph.body().unwrap_or("-")
        ),
        other => error!(
            "Failed to process message {} from {}: {}",
            message_id, sender, other
        ),
    }
}
