//! One-shot loader from a JSON-file store into the SQLite store.
//!
//! Records are inserted oldest first so that assigned ids keep the file's
//! relative order. Original ids are not preserved.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::models::NewTechnology;
use crate::store::{JsonFileStore, SqliteStore, Store};

/// Imports every record of `json_path` into the SQLite database at
/// `[db].path` and returns the number of records inserted.
///
/// With `fresh`, any existing database file is deleted first. This is
/// destructive and a failure part way leaves a partial database.
pub async fn import_json(config: &Config, json_path: &Path, fresh: bool) -> Result<usize> {
    if config.db.backend != "sqlite" {
        anyhow::bail!("import target must be the sqlite backend (db.backend = \"sqlite\")");
    }

    let source = JsonFileStore::new(json_path);
    if !tokio::fs::try_exists(json_path).await? {
        anyhow::bail!("JSON file not found: {}", json_path.display());
    }
    let records = source
        .read_all()
        .await
        .with_context(|| format!("Failed to load {}", json_path.display()))?;
    tracing::info!(count = records.len(), path = %json_path.display(), "read technologies from JSON");

    let db_path = &config.db.path;
    if fresh {
        for suffix in ["", "-wal", "-shm"] {
            let path = format!("{}{}", db_path.display(), suffix);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::info!(path = %path, "removed existing database file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).context("Failed to remove existing database"),
            }
        }
    }

    let target = SqliteStore::open(db_path).await?;
    target.migrate().await?;

    let mut inserted = 0;
    for tech in records {
        target
            .insert(NewTechnology {
                name: tech.name,
                summary: tech.summary,
                description: tech.description,
                categories: tech.categories,
                use_cases: tech.use_cases,
                relevant_links: tech.relevant_links,
                image_url: tech.image_url,
            })
            .await?;
        inserted += 1;
    }

    target.close().await;
    Ok(inserted)
}
