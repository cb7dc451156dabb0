use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// WAL lets several readers run beside the one writer, so concurrent HTTP
/// list/search requests are not queued behind an in-flight `add`.
const MAX_CONNECTIONS: u32 = 5;

/// Opens the SQLite database at `db_path`, creating the file and its parent
/// directory when missing. The returned pool is the single shared handle for
/// the process; close it with [`SqlitePool::close`] on shutdown.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    Ok(SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?)
}
