//! SQLite-backed blob store.
//!
//! Objects are rows in a single `blobs` table keyed by their storage key.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use super::BlobStore;
use crate::errors::AppError;

/// Initialize the database connection pool and create the blob table.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blobs (
            key TEXT PRIMARY KEY,
            body BLOB NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

/// Blob store persisting objects in SQLite.
#[derive(Clone)]
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let row = sqlx::query("SELECT body FROM blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("body")))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO blobs (key, body, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(body)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        // substr comparison avoids LIKE wildcard escaping for keys containing '_'
        let rows = sqlx::query(
            "SELECT key FROM blobs WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("key")).collect())
    }
}
