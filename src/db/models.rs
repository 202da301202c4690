//! Row types and read-side queries over the `matches` table.
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::types::NormalizedRow;

#[derive(Debug, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: i64,
    pub competition: String,
    pub match_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl MatchRecord {
    /// The stored fields minus the store-assigned id and timestamp.
    pub fn to_row(&self) -> NormalizedRow {
        NormalizedRow {
            competition: self.competition.clone(),
            match_date: self.match_date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            score: self.score.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CompetitionCount {
    pub competition: String,
    pub matches: i64,
}

/// All stored matches of one competition, in insertion order.
pub async fn load_matches(pool: &SqlitePool, competition: &str) -> Result<Vec<MatchRecord>> {
    let rows = sqlx::query_as::<_, MatchRecord>(
        r#"
        SELECT id, competition, match_date, home_team, away_team, score, status, created_at
        FROM matches
        WHERE competition = ?
        ORDER BY id
        "#,
    )
    .bind(competition)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_matches(pool: &SqlitePool) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Stored row counts grouped by competition name, alphabetical.
pub async fn count_by_competition(pool: &SqlitePool) -> Result<Vec<CompetitionCount>> {
    let rows = sqlx::query_as::<_, CompetitionCount>(
        r#"
        SELECT competition, COUNT(*) AS matches
        FROM matches
        GROUP BY competition
        ORDER BY competition
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
