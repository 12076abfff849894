//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored lead profile row.
///
/// Set and map fields are JSON-encoded text and timestamps are RFC 3339
/// strings; conversion to domain types happens in the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeadProfileRecord {
    /// Platform-scoped user id.
    pub user_id: String,
    pub name: Option<String>,
    pub topic_of_interest: Option<String>,
    pub category: Option<String>,
    /// Vertical wire label (e.g. "CONCURSOS").
    pub vertical: String,
    /// Funnel stage wire label (e.g. "Etapa 1: Diagnóstico").
    pub funnel_stage: String,
    pub interest_level: i64,
    /// JSON array of objection labels, insertion ordered.
    pub objections: String,
    pub last_topic: Option<String>,
    /// JSON array of questions the lead asked.
    pub questions_asked: String,
    /// JSON object of free-form facts.
    pub extracted_facts: String,
    pub total_messages: i64,
    pub positive_messages: i64,
    pub negative_messages: i64,
    pub first_contact_at: Option<String>,
    pub last_contact_at: Option<String>,
    /// JSON object of free-form metadata.
    pub metadata: String,
}
