//! Storage abstraction for technology records.
//!
//! The [`Store`] trait defines the four operations the request handlers
//! need, with two interchangeable backends:
//!
//! | Backend | Type | Layout |
//! |---------|------|--------|
//! | `sqlite` | [`SqliteStore`] | one `technologies` table, arrays as JSON text |
//! | `json` | [`JsonFileStore`] | one pretty-printed JSON array, rewritten on every mutation |
//!
//! Both backends assign integer ids and return records newest first.

pub mod json_file;
pub mod sqlite;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::models::{NewTechnology, Technology};

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Result of [`Store::delete_by_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Abstract record store.
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// across request handlers behind an `Arc`.
#[async_trait]
pub trait Store: Send + Sync {
    /// All records, newest first.
    async fn list(&self) -> Result<Vec<Technology>>;

    /// Assigns an id, persists the record, and returns it.
    async fn insert(&self, new: NewTechnology) -> Result<Technology>;

    async fn delete_by_id(&self, id: i64) -> Result<DeleteOutcome>;

    /// Every category used by any record, deduplicated, in the order first
    /// seen when reading newest to oldest.
    async fn distinct_categories(&self) -> Result<Vec<String>> {
        let records = self.list().await?;
        Ok(distinct_categories_of(&records))
    }

    /// Releases the underlying handle. Called once on shutdown.
    async fn close(&self) {}
}

pub fn distinct_categories_of(records: &[Technology]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|t| t.categories.iter())
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

/// Opens the backend selected by `[db].backend`.
///
/// The SQLite schema is not created here; run `kb init` first.
pub async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.db.backend.as_str() {
        "sqlite" => Ok(Arc::new(SqliteStore::open(&config.db.path).await?)),
        "json" => Ok(Arc::new(JsonFileStore::new(&config.db.path))),
        other => anyhow::bail!("Unknown db backend: {}", other),
    }
}

/// Creates the backing file or schema for the configured backend.
pub async fn init_store(config: &Config) -> Result<()> {
    match config.db.backend.as_str() {
        "sqlite" => {
            let store = SqliteStore::open(&config.db.path).await?;
            store.migrate().await?;
            store.close().await;
            Ok(())
        }
        "json" => JsonFileStore::new(&config.db.path).init().await,
        other => anyhow::bail!("Unknown db backend: {}", other),
    }
}
