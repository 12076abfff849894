//! Instagram webhook server for the Forefy sales agent.
//!
//! Receives direct messages from the platform webhook, verifies their
//! signature, acknowledges at once and hands each message to the
//! [`orchestrator::Agent`] in the background. Replies go back through
//! [`instagram_client::Delivery`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/instagram/webhook` | Subscription handshake |
//! | POST | `/api/instagram/webhook` | Message events |
//! | POST | `/api/instagram/test-agent` | Run the agent directly (development) |
//! | POST | `/api/instagram/clear-memory` | Drop a session (development) |
//! | GET | `/api/instagram/validate-token` | Check the access token (development) |
//! | GET | `/api/instagram/active-leads` | Recently active leads (development) |

pub mod config;
pub mod dispatch;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ServerError;
pub use routes::{app, router, API_PREFIX};
pub use state::AppState;
