//! SQLite-backed [`Store`] implementation.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db;
use crate::migrate;
use crate::models::{NewTechnology, Technology};

use super::{DeleteOutcome, Store};

/// SQLite implementation of the [`Store`] trait.
///
/// Wraps the process-wide [`SqlitePool`]. Array fields are written as JSON
/// text and parsed back on read; NULL reads as an empty list.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn encode_list(items: &[String]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn decode_list(column: &str, raw: Option<String>) -> Result<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s)
            .with_context(|| format!("corrupt JSON in column {}", column)),
    }
}

fn row_to_technology(row: &SqliteRow) -> Result<Technology> {
    Ok(Technology {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        summary: row.try_get("summary")?,
        description: row
            .try_get::<Option<String>, _>("description")?
            .unwrap_or_default(),
        categories: decode_list("categories", row.try_get("categories")?)?,
        use_cases: decode_list("use_cases", row.try_get("use_cases")?)?,
        relevant_links: decode_list("relevant_links", row.try_get("relevant_links")?)?,
        image_url: row
            .try_get::<Option<String>, _>("image_url")?
            .unwrap_or_default(),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn list(&self) -> Result<Vec<Technology>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, summary, description, categories, use_cases,
                   relevant_links, image_url
            FROM technologies
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_technology).collect()
    }

    async fn insert(&self, new: NewTechnology) -> Result<Technology> {
        let result = sqlx::query(
            r#"
            INSERT INTO technologies (name, summary, description, categories,
                                      use_cases, relevant_links, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.summary)
        .bind(&new.description)
        .bind(encode_list(&new.categories)?)
        .bind(encode_list(&new.use_cases)?)
        .bind(encode_list(&new.relevant_links)?)
        .bind(&new.image_url)
        .execute(&self.pool)
        .await?;

        Ok(new.with_id(result.last_insert_rowid()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<DeleteOutcome> {
        let result = sqlx::query("DELETE FROM technologies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_migrated(tmp: &TempDir) -> SqliteStore {
        let store = SqliteStore::open(&tmp.path().join("kb.sqlite")).await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn new_tech(name: &str) -> NewTechnology {
        NewTechnology {
            name: name.to_string(),
            summary: format!("{} summary", name),
            description: String::new(),
            categories: vec!["A".into(), "B".into()],
            use_cases: vec![],
            relevant_links: vec!["http://x".into()],
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_list_round_trips_arrays() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        let inserted = store.insert(new_tech("Rust")).await.unwrap();
        let listed = store.list().await.unwrap();

        assert_eq!(listed, vec![inserted.clone()]);
        assert_eq!(listed[0].categories, vec!["A", "B"]);
        assert!(listed[0].use_cases.is_empty());
        assert_eq!(listed[0].relevant_links, vec!["http://x"]);
        assert_eq!(listed[0].image_url, "");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        let a = store.insert(new_tech("a")).await.unwrap();
        let b = store.insert(new_tech("b")).await.unwrap();
        assert!(b.id > a.id);

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_null_arrays_read_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        sqlx::query("INSERT INTO technologies (name, summary) VALUES ('legacy', 's')")
            .execute(store.pool())
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].categories.is_empty());
        assert!(listed[0].relevant_links.is_empty());
        assert_eq!(listed[0].description, "");
    }

    #[tokio::test]
    async fn test_corrupt_array_column_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        sqlx::query("INSERT INTO technologies (name, summary, categories) VALUES ('x', 's', '[oops')")
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.list().await.unwrap_err();
        assert!(format!("{:#}", err).contains("categories"));
    }

    #[tokio::test]
    async fn test_missing_table_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::open(&tmp.path().join("kb.sqlite")).await.unwrap();
        assert!(store.list().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        let a = store.insert(new_tech("a")).await.unwrap();
        let b = store.insert(new_tech("b")).await.unwrap();

        assert_eq!(store.delete_by_id(a.id).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete_by_id(a.id).await.unwrap(), DeleteOutcome::NotFound);
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_distinct_categories() {
        let tmp = TempDir::new().unwrap();
        let store = open_migrated(&tmp).await;

        store.insert(new_tech("a")).await.unwrap();
        let mut c = new_tech("c");
        c.categories = vec!["B".into(), "C".into()];
        store.insert(c).await.unwrap();

        assert_eq!(store.distinct_categories().await.unwrap(), vec!["B", "C", "A"]);
    }
}
