//! Long-term lead memory.
//!
//! [`LeadProfileStore`] keeps a process-wide cache in front of the durable
//! `lead_profiles` table. The durable store is strictly best-effort: when
//! its table is missing the store switches to cache-only for the rest of
//! the process, and write failures are logged and swallowed.

use std::collections::HashMap;
use std::sync::Arc;

use brain_core::{FunnelStage, Vertical};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use database::{lead_profile, Database, LeadProfileRecord};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::error::ProfileError;
use crate::extract::Sentiment;

/// Questions kept per lead, most recent last.
const MAX_QUESTIONS: usize = 20;

/// Durable, cross-session facts about one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub topic_of_interest: Option<String>,
    pub category: Option<String>,
    pub vertical: Vertical,
    pub funnel_stage: FunnelStage,
    pub interest_level: i64,
    /// Insertion ordered, never duplicated.
    pub objections: IndexSet<String>,
    pub last_topic: Option<String>,
    pub questions_asked: Vec<String>,
    pub extracted_facts: Map<String, Value>,
    pub total_messages: i64,
    pub positive_messages: i64,
    pub negative_messages: i64,
    pub first_contact_at: Option<DateTime<Utc>>,
    pub last_contact_at: Option<DateTime<Utc>>,
    pub metadata: Map<String, Value>,
}

impl LeadProfile {
    /// A fresh profile for a previously unseen lead.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            topic_of_interest: None,
            category: None,
            vertical: Vertical::Unknown,
            funnel_stage: FunnelStage::Diagnosis,
            interest_level: 0,
            objections: IndexSet::new(),
            last_topic: None,
            questions_asked: Vec::new(),
            extracted_facts: Map::new(),
            total_messages: 0,
            positive_messages: 0,
            negative_messages: 0,
            first_contact_at: None,
            last_contact_at: None,
            metadata: Map::new(),
        }
    }

    /// Merge a partial update for one processed message.
    ///
    /// Present fields overwrite, absent fields are kept, the objection is
    /// added to the set and `total_messages` grows by exactly one.
    pub fn apply(&mut self, update: LeadUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(topic) = update.topic_of_interest {
            self.topic_of_interest = Some(topic);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(vertical) = update.vertical {
            self.vertical = vertical;
        }
        if let Some(stage) = update.funnel_stage {
            self.funnel_stage = stage;
        }
        if let Some(level) = update.interest_level {
            self.interest_level = level;
        }
        if let Some(objection) = update.objection {
            self.objections.insert(objection);
        }
        if let Some(last_topic) = update.last_topic {
            self.last_topic = Some(last_topic);
        }
        if let Some(question) = update.question {
            self.questions_asked.push(question);
            if self.questions_asked.len() > MAX_QUESTIONS {
                let excess = self.questions_asked.len() - MAX_QUESTIONS;
                self.questions_asked.drain(..excess);
            }
        }
        self.extracted_facts.extend(update.facts);

        match update.sentiment {
            Sentiment::Positive => self.positive_messages += 1,
            Sentiment::Negative => self.negative_messages += 1,
            Sentiment::Neutral => {}
        }

        self.total_messages += 1;
        self.first_contact_at.get_or_insert(now);
        self.last_contact_at = Some(now);
    }

    /// Human-readable block of known facts for prompt injection.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref name) = self.name {
            parts.push(format!("Nome: {}", name));
        }
        if let Some(ref topic) = self.topic_of_interest {
            parts.push(format!("Concurso de interesse: {}", topic));
        }
        if let Some(ref category) = self.category {
            parts.push(format!("Área: {}", category));
        }
        if self.vertical.is_known() {
            parts.push(format!("Vertical: {}", self.vertical));
        }
        parts.push(format!("Estágio do funil: {}", self.funnel_stage));
        parts.push(format!("Total de mensagens: {}", self.total_messages));

        if !self.objections.is_empty() {
            let objections: Vec<&str> = self.objections.iter().map(String::as_str).collect();
            parts.push(format!("Objeções: {}", objections.join(", ")));
        }
        if let Some(ref last_topic) = self.last_topic {
            parts.push(format!("Último tópico: {}", last_topic));
        }

        parts.join("\n")
    }

    fn to_record(&self) -> LeadProfileRecord {
        LeadProfileRecord {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            topic_of_interest: self.topic_of_interest.clone(),
            category: self.category.clone(),
            vertical: self.vertical.as_str().to_string(),
            funnel_stage: self.funnel_stage.as_str().to_string(),
            interest_level: self.interest_level,
            objections: Value::from(self.objections.iter().cloned().collect::<Vec<_>>()).to_string(),
            last_topic: self.last_topic.clone(),
            questions_asked: Value::from(self.questions_asked.clone()).to_string(),
            extracted_facts: Value::Object(self.extracted_facts.clone()).to_string(),
            total_messages: self.total_messages,
            positive_messages: self.positive_messages,
            negative_messages: self.negative_messages,
            first_contact_at: self.first_contact_at.as_ref().map(timestamp),
            last_contact_at: self.last_contact_at.as_ref().map(timestamp),
            metadata: Value::Object(self.metadata.clone()).to_string(),
        }
    }
}

impl TryFrom<LeadProfileRecord> for LeadProfile {
    type Error = ProfileError;

    fn try_from(record: LeadProfileRecord) -> Result<Self, Self::Error> {
        let user_id = record.user_id;
        let decode = |field: &str, reason: String| ProfileError::Decode {
            user_id: user_id.clone(),
            reason: format!("{}: {}", field, reason),
        };

        let objections: IndexSet<String> = serde_json::from_str(&record.objections)
            .map_err(|e| decode("objections", e.to_string()))?;
        let questions_asked: Vec<String> = serde_json::from_str(&record.questions_asked)
            .map_err(|e| decode("questions_asked", e.to_string()))?;
        let extracted_facts: Map<String, Value> = serde_json::from_str(&record.extracted_facts)
            .map_err(|e| decode("extracted_facts", e.to_string()))?;
        let metadata: Map<String, Value> = serde_json::from_str(&record.metadata)
            .map_err(|e| decode("metadata", e.to_string()))?;
        let first_contact_at = record
            .first_contact_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| decode("first_contact_at", e.to_string()))?;
        let last_contact_at = record
            .last_contact_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| decode("last_contact_at", e.to_string()))?;

        Ok(Self {
            vertical: record.vertical.parse().unwrap_or_default(),
            funnel_stage: record.funnel_stage.parse().unwrap_or_default(),
            name: record.name,
            topic_of_interest: record.topic_of_interest,
            category: record.category,
            interest_level: record.interest_level,
            objections,
            last_topic: record.last_topic,
            questions_asked,
            extracted_facts,
            total_messages: record.total_messages,
            positive_messages: record.positive_messages,
            negative_messages: record.negative_messages,
            first_contact_at,
            last_contact_at,
            metadata,
            user_id,
        })
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc))
}

/// Partial profile fields derived from one conversation turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub topic_of_interest: Option<String>,
    pub category: Option<String>,
    pub vertical: Option<Vertical>,
    pub funnel_stage: Option<FunnelStage>,
    pub interest_level: Option<i64>,
    /// Added to the objection set.
    pub objection: Option<String>,
    pub last_topic: Option<String>,
    /// Appended to the question log.
    pub question: Option<String>,
    pub facts: Map<String, Value>,
    pub sentiment: Sentiment,
}

/// Cache-fronted lead profile storage.
pub struct LeadProfileStore {
    cache: RwLock<HashMap<String, LeadProfile>>,
    database: Option<Database>,
    /// Memoized result of the table check.
    available: OnceCell<bool>,
    /// Serializes get-merge-save per lead.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for LeadProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadProfileStore {
    /// Create a cache-only store.
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            database: None,
            available: OnceCell::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store backed by the durable lead table.
    pub fn with_database(database: Database) -> Self {
        Self {
            database: Some(database),
            ..Self::new()
        }
    }

    /// The durable store, if configured and its table exists.
    ///
    /// The table check runs once; its outcome holds for the process lifetime.
    async fn durable(&self) -> Option<&Database> {
        let database = self.database.as_ref()?;

        let available = *self
            .available
            .get_or_init(|| async {
                match lead_profile::table_exists(database.pool()).await {
                    Ok(true) => {
                        info!("Lead profile table found, durable storage enabled");
                        true
                    }
                    Ok(false) => {
                        warn!("Lead profile table missing, using in-memory cache only");
                        false
                    }
                    Err(e) => {
                        warn!("Lead profile table check failed ({}), using in-memory cache only", e);
                        false
                    }
                }
            })
            .await;

        available.then_some(database)
    }

    /// Whether writes reach the durable store.
    pub async fn is_durable(&self) -> bool {
        self.durable().await.is_some()
    }

    /// Get a lead's profile from the cache, else from the durable store.
    ///
    /// Returns `None` for unknown leads and when the store is unavailable.
    pub async fn get(&self, user_id: &str) -> Option<LeadProfile> {
        if let Some(profile) = self.cache.read().await.get(user_id) {
            return Some(profile.clone());
        }

        let database = self.durable().await?;
        let record = match lead_profile::get_lead(database.pool(), user_id).await {
            Ok(record) => record?,
            Err(e) => {
                warn!("Failed to load lead profile for {}: {}", user_id, e);
                return None;
            }
        };

        match LeadProfile::try_from(record) {
            Ok(profile) => {
                self.cache
                    .write()
                    .await
                    .insert(user_id.to_string(), profile.clone());
                Some(profile)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Store a profile in the cache and, best effort, in the durable store.
    pub async fn save(&self, profile: LeadProfile) {
        let record = profile.to_record();
        self.cache
            .write()
            .await
            .insert(profile.user_id.clone(), profile);

        let Some(database) = self.durable().await else {
            return;
        };

        match lead_profile::upsert_lead(database.pool(), &record).await {
            Ok(()) => debug!(
                "Saved lead profile for {} (stage: {})",
                record.user_id, record.funnel_stage
            ),
            Err(e) => warn!("Failed to save lead profile for {}: {}", record.user_id, e),
        }
    }

    /// Read-merge-write one turn's update and return the merged profile.
    ///
    /// Concurrent updates for the same lead are applied one after another.
    pub async fn update(&self, user_id: &str, update: LeadUpdate) -> LeadProfile {
        let lock = self.user_lock(user_id).await;

        let merged = {
            let _guard = lock.lock().await;
            let mut profile = self
                .get(user_id)
                .await
                .unwrap_or_else(|| LeadProfile::new(user_id));
            profile.apply(update, Utc::now());
            self.save(profile.clone()).await;
            profile
        };

        self.release_lock(user_id, lock).await;
        merged
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    async fn release_lock(&self, user_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(user_id)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            locks.remove(user_id);
        }
    }

    /// Leads contacted within the last `hours`, most recent first.
    ///
    /// Served from the cache when the durable store is unavailable. A
    /// window reaching past the representable time range lists every lead
    /// with a recorded contact.
    pub async fn active_leads(&self, hours: i64) -> Vec<LeadProfile> {
        let cutoff = Duration::try_hours(hours)
            .and_then(|window| Utc::now().checked_sub_signed(window));

        let Some(database) = self.durable().await else {
            let mut leads: Vec<LeadProfile> = self
                .cache
                .read()
                .await
                .values()
                .filter(|p| {
                    p.last_contact_at
                        .is_some_and(|at| cutoff.map_or(true, |cutoff| at >= cutoff))
                })
                .cloned()
                .collect();
            leads.sort_by(|a, b| b.last_contact_at.cmp(&a.last_contact_at));
            return leads;
        };

        let since = cutoff.as_ref().map(timestamp).unwrap_or_default();
        match lead_profile::list_active_since(database.pool(), &since).await {
            Ok(records) => records
                .into_iter()
                .filter_map(|record| match LeadProfile::try_from(record) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!("Failed to list active leads: {}", e);
                Vec::new()
            }
        }
    }

    /// Number of cached profiles.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objection(label: &str) -> LeadUpdate {
        LeadUpdate {
            objection: Some(label.to_string()),
            ..LeadUpdate::default()
        }
    }

    async fn migrated_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = LeadProfile::new("u1");
        assert_eq!(profile.vertical, Vertical::Unknown);
        assert_eq!(profile.funnel_stage, FunnelStage::Diagnosis);
        assert_eq!(profile.total_messages, 0);
        assert!(profile.objections.is_empty());
    }

    #[test]
    fn test_apply_same_update_twice() {
        let mut profile = LeadProfile::new("u1");
        let update = objection("PREÇO");
        let now = Utc::now();

        profile.apply(update.clone(), now);
        profile.apply(update, now);

        assert_eq!(profile.total_messages, 2);
        assert_eq!(profile.objections.len(), 1);
        assert_eq!(profile.first_contact_at, Some(now));
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut profile = LeadProfile::new("u1");
        profile.apply(
            LeadUpdate {
                topic_of_interest: Some("POLÍCIA FEDERAL".to_string()),
                category: Some("POLICIAL".to_string()),
                sentiment: Sentiment::Positive,
                ..LeadUpdate::default()
            },
            Utc::now(),
        );
        profile.apply(
            LeadUpdate {
                funnel_stage: Some(FunnelStage::Offer),
                sentiment: Sentiment::Negative,
                ..objection("PREÇO")
            },
            Utc::now(),
        );

        assert_eq!(profile.topic_of_interest.as_deref(), Some("POLÍCIA FEDERAL"));
        assert_eq!(profile.category.as_deref(), Some("POLICIAL"));
        assert_eq!(profile.funnel_stage, FunnelStage::Offer);
        assert_eq!(profile.positive_messages, 1);
        assert_eq!(profile.negative_messages, 1);
        assert_eq!(profile.total_messages, 2);
    }

    #[test]
    fn test_question_log_is_bounded() {
        let mut profile = LeadProfile::new("u1");
        for i in 0..25 {
            profile.apply(
                LeadUpdate {
                    question: Some(format!("pergunta {}?", i)),
                    ..LeadUpdate::default()
                },
                Utc::now(),
            );
        }
        assert_eq!(profile.questions_asked.len(), MAX_QUESTIONS);
        assert_eq!(profile.questions_asked[0], "pergunta 5?");
    }

    #[test]
    fn test_summary() {
        let mut profile = LeadProfile::new("u1");
        assert_eq!(
            profile.summary(),
            "Estágio do funil: Etapa 1: Diagnóstico\nTotal de mensagens: 0"
        );

        profile.name = Some("João".to_string());
        profile.topic_of_interest = Some("POLÍCIA FEDERAL".to_string());
        profile.category = Some("POLICIAL".to_string());
        profile.vertical = Vertical::Concursos;
        profile.total_messages = 3;
        profile.objections.insert("PREÇO".to_string());
        profile.objections.insert("TEMPO".to_string());
        profile.last_topic = Some("Quanto custa?".to_string());

        assert_eq!(
            profile.summary(),
            "Nome: João\n\
             Concurso de interesse: POLÍCIA FEDERAL\n\
             Área: POLICIAL\n\
             Vertical: CONCURSOS\n\
             Estágio do funil: Etapa 1: Diagnóstico\n\
             Total de mensagens: 3\n\
             Objeções: PREÇO, TEMPO\n\
             Último tópico: Quanto custa?"
        );
    }

    #[test]
    fn test_record_conversion() {
        let mut profile = LeadProfile::new("u1");
        profile.apply(
            LeadUpdate {
                vertical: Some(Vertical::Oab),
                question: Some("Tem OAB?".to_string()),
                ..objection("CONFIANÇA")
            },
            Utc::now(),
        );
        profile
            .extracted_facts
            .insert("cidade".to_string(), Value::from("Recife"));

        let record = profile.to_record();
        assert_eq!(record.vertical, "OAB");
        assert_eq!(record.objections, r#"["CONFIANÇA"]"#);

        let restored = LeadProfile::try_from(record).unwrap();
        assert_eq!(restored.vertical, Vertical::Oab);
        assert_eq!(restored.questions_asked, vec!["Tem OAB?".to_string()]);
        assert_eq!(restored.extracted_facts["cidade"], "Recife");
        assert_eq!(
            restored.last_contact_at.map(|t| t.timestamp_millis()),
            profile.last_contact_at.map(|t| t.timestamp_millis())
        );
    }

    #[test]
    fn test_record_decode_error() {
        let mut record = LeadProfile::new("u1").to_record();
        record.objections = "not json".to_string();

        match LeadProfile::try_from(record) {
            Err(ProfileError::Decode { user_id, reason }) => {
                assert_eq!(user_id, "u1");
                assert!(reason.starts_with("objections"));
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_only_update() {
        let store = LeadProfileStore::new();
        assert!(store.get("u1").await.is_none());
        assert!(!store.is_durable().await);

        store.update("u1", objection("PREÇO")).await;
        let profile = store.update("u1", objection("PREÇO")).await;

        assert_eq!(profile.total_messages, 2);
        assert_eq!(profile.objections.len(), 1);
        assert_eq!(store.get("u1").await, Some(profile));
    }

    #[tokio::test]
    async fn test_missing_table_is_memoized() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let store = LeadProfileStore::with_database(db.clone());

        assert!(!store.is_durable().await);
        store.update("u1", LeadUpdate::default()).await;

        // Creating the table later does not re-enable durable writes.
        db.migrate().await.unwrap();
        assert!(!store.is_durable().await);
        store.update("u1", LeadUpdate::default()).await;

        assert_eq!(store.get("u1").await.unwrap().total_messages, 2);
        assert!(lead_profile::get_lead(db.pool(), "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_durable_round_trip() {
        let db = migrated_db().await;

        let first = LeadProfileStore::with_database(db.clone());
        assert!(first.is_durable().await);
        first
            .update(
                "u1",
                LeadUpdate {
                    name: Some("Ana".to_string()),
                    funnel_stage: Some(FunnelStage::Classification),
                    ..objection("TEMPO")
                },
            )
            .await;

        // A fresh store has an empty cache and must read the durable row.
        let second = LeadProfileStore::with_database(db);
        assert_eq!(second.cached_count().await, 0);
        let profile = second.get("u1").await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.funnel_stage, FunnelStage::Classification);
        assert!(profile.objections.contains("TEMPO"));
        assert_eq!(profile.total_messages, 1);
        assert_eq!(second.cached_count().await, 1);
    }

    #[tokio::test]
    async fn test_active_leads() {
        let db = migrated_db().await;
        let durable = LeadProfileStore::with_database(db);
        let cache_only = LeadProfileStore::new();

        for store in [&durable, &cache_only] {
            store.update("old", LeadUpdate::default()).await;
            let mut stale = store.get("old").await.unwrap();
            stale.last_contact_at = Some(Utc::now() - Duration::hours(48));
            store.save(stale).await;

            store.update("a", LeadUpdate::default()).await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            store.update("b", LeadUpdate::default()).await;

            let ids: Vec<String> = store
                .active_leads(24)
                .await
                .into_iter()
                .map(|p| p.user_id)
                .collect();
            assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_active_leads_with_huge_window() {
        let db = migrated_db().await;
        let durable = LeadProfileStore::with_database(db);
        let cache_only = LeadProfileStore::new();

        for store in [&durable, &cache_only] {
            store.update("a", LeadUpdate::default()).await;

            for hours in [i64::MAX / 1000, i64::MAX] {
                let leads = store.active_leads(hours).await;
                assert_eq!(leads.len(), 1);
                assert_eq!(leads[0].user_id, "a");
            }
        }
    }

    #[tokio::test]
    async fn test_durable_write_failure_keeps_cache() {
        let db = migrated_db().await;
        let store = LeadProfileStore::with_database(db.clone());
        assert!(store.is_durable().await);

        db.close().await;

        let profile = store
            .update(
                "u1",
                LeadUpdate {
                    name: Some("Ana".to_string()),
                    ..objection("PREÇO")
                },
            )
            .await;
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert!(profile.objections.contains("PREÇO"));
        assert_eq!(profile.total_messages, 1);

        assert_eq!(store.get("u1").await, Some(profile));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(LeadProfileStore::new());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update("u1", objection(if i % 2 == 0 { "PREÇO" } else { "TEMPO" }))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let profile = store.get("u1").await.unwrap();
        assert_eq!(profile.total_messages, 20);
        assert_eq!(profile.objections.len(), 2);
        assert!(store.locks.lock().await.is_empty());
    }
}
