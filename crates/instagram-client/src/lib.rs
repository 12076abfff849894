//! Instagram messaging plumbing.
//!
//! This crate covers everything that touches the platform directly:
//!
//! - [`signature`] - `X-Hub-Signature-256` verification of inbound webhooks
//! - [`webhook`] - Parsing webhook payloads into [`brain_core::InboundMessage`]
//! - [`GraphClient`] - Graph API client for the messaging endpoint
//! - [`Delivery`] - Outbound sends with bounded retry and exponential backoff
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use instagram_client::{Delivery, GraphClient, GraphConfig, RetryPolicy};
//!
//! # async fn example() -> Result<(), instagram_client::GraphError> {
//! let client = GraphClient::new(GraphConfig::new("IGQV..."))?;
//! let delivery = Delivery::new(Arc::new(client), RetryPolicy::default());
//!
//! let sent = delivery.send_with_retry("17841400000000000", "Fala! Qual concurso você mira?").await?;
//! println!("Sent message {}", sent.message_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod signature;
pub mod types;
pub mod webhook;

pub use client::{GraphClient, Transport};
pub use config::GraphConfig;
pub use delivery::{Delivery, RetryPolicy};
pub use error::GraphError;
pub use signature::{SignatureError, SignatureVerifier, Verification, SIGNATURE_HEADER};
pub use types::{SendPayload, SendResponse};
