pub mod models;
pub mod schema;
pub mod writer;

pub use schema::{ensure_schema, SchemaMode};
pub use writer::MatchWriter;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::Result;

/// Opens the SQLite file named by DB_PATH, creating it when missing. One
/// connection per concurrent pipeline plus one for the schema/summary queries.
pub async fn open_pool(cfg: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&cfg.db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.concurrency as u32 + 1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Single-connection in-memory pool; the database lives as long as that connection.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool")
}
