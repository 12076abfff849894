//! Lead-state-aware conversation pipeline for the Instagram sales agent.
//!
//! This crate provides the [`Agent`] type, which turns one inbound direct
//! message into a structured [`AgentOutput`] while keeping two kinds of
//! memory about the lead:
//!
//! - short-term session turns ([`brain_core::SessionMemory`])
//! - a durable [`LeadProfile`] behind a cache ([`LeadProfileStore`])
//!
//! # Architecture
//!
//! ```text
//! Inbound message (from webhook-server)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          AGENT                              │
//! │                                                             │
//! │  1. Fetch lead profile (cache → SQLite → fresh default)     │
//! │         ↓                                                   │
//! │  2. Build prompt: persona + format + lead block + session   │
//! │         ↓                                                   │
//! │  3. Invoke brain with tools (documents, search_web),        │
//! │     bounded by iterations and a timeout                     │
//! │         ↓                                                   │
//! │  4. Parse output: strict → extracted → default              │
//! │         ↓                                                   │
//! │  5. Extract signals, merge into the lead profile            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{Agent, AgentConfig, LeadProfileStore};
//!
//! let agent = Agent::new(
//!     Arc::new(azure_brain::AzureBrain::from_env()?),
//!     Arc::new(tools),
//!     LeadProfileStore::with_database(database),
//!     AgentConfig::from_env()?,
//! );
//!
//! let output = agent.process("1789", "Quero saber sobre concurso da PF").await?;
//! println!("{}", output.response_message);
//! ```

mod agent;
mod config;
mod context;
mod error;
mod extract;
mod output;
mod profile;
pub mod prompt;

pub use agent::Agent;
pub use config::{AgentConfig, AgentConfigBuilder};
pub use context::PromptContext;
pub use error::{AgentError, ProfileError};
pub use extract::{Sentiment, SignalExtractor, Signals};
pub use output::{default_output, extract_embedded, parse_strict, ParsedOutput, RECOVERY_LINE};
pub use profile::{LeadProfile, LeadProfileStore, LeadUpdate};

// Re-export commonly used types from dependencies
pub use brain_core::{AgentOutput, FunnelStage, InboundMessage, Vertical};
