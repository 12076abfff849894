//! Lead profile storage.

use sqlx::SqlitePool;

use crate::models::LeadProfileRecord;
use crate::Result;

const SELECT_COLUMNS: &str = r#"
    SELECT user_id, name, topic_of_interest, category, vertical, funnel_stage,
           interest_level, objections, last_topic, questions_asked, extracted_facts,
           total_messages, positive_messages, negative_messages,
           first_contact_at, last_contact_at, metadata
    FROM lead_profiles
"#;

/// Check that the lead profile table is present.
///
/// Returns `Ok(false)` when the table is missing and an error for any other
/// failure.
pub async fn table_exists(pool: &SqlitePool) -> Result<bool> {
    match sqlx::query("SELECT user_id FROM lead_profiles LIMIT 1")
        .fetch_optional(pool)
        .await
    {
        Ok(_) => Ok(true),
        Err(err) => {
            let err = crate::DatabaseError::from(err);
            if err.is_missing_table() {
                Ok(false)
            } else {
                Err(err)
            }
        }
    }
}

/// Get a lead's profile.
pub async fn get_lead(pool: &SqlitePool, user_id: &str) -> Result<Option<LeadProfileRecord>> {
    let query = format!("{} WHERE user_id = ?", SELECT_COLUMNS);
    let record = sqlx::query_as::<_, LeadProfileRecord>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Insert or replace a lead's profile.
///
/// `first_contact_at` is kept from the existing row when already set.
pub async fn upsert_lead(pool: &SqlitePool, record: &LeadProfileRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lead_profiles (
            user_id, name, topic_of_interest, category, vertical, funnel_stage,
            interest_level, objections, last_topic, questions_asked, extracted_facts,
            total_messages, positive_messages, negative_messages,
            first_contact_at, last_contact_at, metadata
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            name = excluded.name,
            topic_of_interest = excluded.topic_of_interest,
            category = excluded.category,
            vertical = excluded.vertical,
            funnel_stage = excluded.funnel_stage,
            interest_level = excluded.interest_level,
            objections = excluded.objections,
            last_topic = excluded.last_topic,
            questions_asked = excluded.questions_asked,
            extracted_facts = excluded.extracted_facts,
            total_messages = excluded.total_messages,
            positive_messages = excluded.positive_messages,
            negative_messages = excluded.negative_messages,
            first_contact_at = COALESCE(lead_profiles.first_contact_at, excluded.first_contact_at),
            last_contact_at = excluded.last_contact_at,
            metadata = excluded.metadata,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(&record.user_id)
    .bind(&record.name)
    .bind(&record.topic_of_interest)
    .bind(&record.category)
    .bind(&record.vertical)
    .bind(&record.funnel_stage)
    .bind(record.interest_level)
    .bind(&record.objections)
    .bind(&record.last_topic)
    .bind(&record.questions_asked)
    .bind(&record.extracted_facts)
    .bind(record.total_messages)
    .bind(record.positive_messages)
    .bind(record.negative_messages)
    .bind(&record.first_contact_at)
    .bind(&record.last_contact_at)
    .bind(&record.metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// List leads contacted at or after `cutoff` (RFC 3339), most recent first.
pub async fn list_active_since(
    pool: &SqlitePool,
    cutoff: &str,
) -> Result<Vec<LeadProfileRecord>> {
    let query = format!(
        "{} WHERE last_contact_at >= ? ORDER BY last_contact_at DESC",
        SELECT_COLUMNS
    );
    let records = sqlx::query_as::<_, LeadProfileRecord>(&query)
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

    Ok(records)
}
