//! SQLite persistence layer for lead profiles.
//!
//! This crate provides async database operations for the durable lead
//! profile table using SQLx with SQLite. Higher layers treat it as
//! best-effort storage: [`lead_profile::table_exists`] lets them detect a
//! missing schema and fall back to an in-memory cache.
//!
//! # Example
//!
//! ```no_run
//! use database::{lead_profile, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:leads.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     if let Some(lead) = lead_profile::get_lead(db.pool(), "17841400000000000").await? {
//!         println!("{} messages so far", lead.total_messages);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod lead_profile;
pub mod models;

pub use error::{DatabaseError, Result};
pub use models::LeadProfileRecord;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Connections kept for file databases.
const FILE_POOL_SIZE: u32 = 5;

/// How long a writer waits on a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lead profile store handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a SQLite database, creating the file if needed.
    ///
    /// File databases use WAL so webhook tasks can read while another
    /// writes. `sqlite::memory:` gets a single connection, since each
    /// connection would otherwise see its own empty database.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/leads.db?mode=rwc").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_size = if in_memory { 1 } else { FILE_POOL_SIZE };
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        info!("Lead database open: {} ({} connections)", url, pool_size);
        Ok(Self { pool })
    }

    /// Create or upgrade the `lead_profiles` schema.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Lead database schema up to date");
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_migrate_in_memory() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        // Running migrations twice is a no-op.
        db.migrate().await.unwrap();
        assert!(lead_profile::table_exists(db.pool()).await.unwrap());
        db.close().await;
    }
}
