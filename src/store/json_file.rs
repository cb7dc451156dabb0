//! Flat JSON-file [`Store`] implementation.
//!
//! The file holds a single pretty-printed array of [`Technology`] objects in
//! insertion order. Every mutation reads the whole document, modifies it in
//! memory, and writes it back. A missing file reads as an empty store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{NewTechnology, Technology};

use super::{DeleteOutcome, Store};

pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process only.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Writes an empty array if the file does not exist yet.
    pub async fn init(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.write_all(&[]).await
    }

    /// Reads every record in file (insertion) order.
    pub async fn read_all(&self) -> Result<Vec<Technology>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", self.path.display()))
    }

    async fn write_all(&self, records: &[Technology]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn list(&self) -> Result<Vec<Technology>> {
        let mut records = self.read_all().await?;
        records.reverse();
        Ok(records)
    }

    async fn insert(&self, new: NewTechnology) -> Result<Technology> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let id = records.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let tech = new.with_id(id);
        records.push(tech.clone());
        self.write_all(&records).await?;
        Ok(tech)
    }

    async fn delete_by_id(&self, id: i64) -> Result<DeleteOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|t| t.id != id);
        if records.len() == before {
            return Ok(DeleteOutcome::NotFound);
        }
        self.write_all(&records).await?;
        Ok(DeleteOutcome::Deleted)
    }
}
