use anyhow::Result;
use sqlx::SqlitePool;

/// Creates the `technologies` table if it does not exist yet.
///
/// Array-valued fields are stored as JSON text. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS technologies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            summary TEXT NOT NULL,
            description TEXT,
            categories TEXT,
            use_cases TEXT,
            relevant_links TEXT,
            image_url TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_technologies_name ON technologies(name)")
        .execute(pool)
        .await?;

    Ok(())
}
