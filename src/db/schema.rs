//! DDL for the `matches` table and the schema setup run once per pipeline run.

use std::str::FromStr;

use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;

pub const DROP_MATCHES: &str = "DROP TABLE IF EXISTS matches";

pub const CREATE_MATCHES: &str = r#"
CREATE TABLE matches (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    competition VARCHAR(50)  NOT NULL,
    match_date  DATE         NOT NULL,
    home_team   VARCHAR(100) NOT NULL,
    away_team   VARCHAR(100) NOT NULL,
    score       VARCHAR(20)  NOT NULL,
    status      VARCHAR(50)  NOT NULL,
    created_at  TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

pub const CREATE_MATCHES_IF_MISSING: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    competition VARCHAR(50)  NOT NULL,
    match_date  DATE         NOT NULL,
    home_team   VARCHAR(100) NOT NULL,
    away_team   VARCHAR(100) NOT NULL,
    score       VARCHAR(20)  NOT NULL,
    status      VARCHAR(50)  NOT NULL,
    created_at  TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Fixture key used for upserts in preserve mode. Undecided fixtures all read
/// `TBD` vs `TBD`, so they are left out of the key; the literal must match
/// `types::TEAM_PLACEHOLDER`.
pub const CREATE_FIXTURE_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS matches_fixture_idx
    ON matches (competition, match_date, home_team, away_team)
    WHERE home_team <> 'TBD' AND away_team <> 'TBD'
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Drop and recreate the table every run; nothing survives across runs.
    #[default]
    Recreate,
    /// Create the table only if missing and upsert rows on the fixture key.
    Preserve,
}

impl std::fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaMode::Recreate => "recreate",
            SchemaMode::Preserve => "preserve",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SchemaMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recreate" => Ok(SchemaMode::Recreate),
            "preserve" => Ok(SchemaMode::Preserve),
            other => Err(format!("SCHEMA_MODE must be 'recreate' or 'preserve', got '{other}'")),
        }
    }
}

/// Prepares the `matches` table. In recreate mode all previous rows are lost.
/// The transaction is committed on success and rolled back on drop otherwise,
/// returning its connection to the pool either way.
pub async fn ensure_schema(pool: &SqlitePool, mode: SchemaMode) -> Result<()> {
    let mut tx = pool.begin().await?;

    match mode {
        SchemaMode::Recreate => {
            sqlx::query(DROP_MATCHES).execute(&mut *tx).await?;
            info!("Dropped table matches if it existed");
            sqlx::query(CREATE_MATCHES).execute(&mut *tx).await?;
        }
        SchemaMode::Preserve => {
            sqlx::query(CREATE_MATCHES_IF_MISSING).execute(&mut *tx).await?;
            sqlx::query(CREATE_FIXTURE_INDEX).execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;
    info!(mode = %mode, "Table matches ready");
    Ok(())
}
