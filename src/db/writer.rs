use std::collections::BTreeSet;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::db::SchemaMode;
use crate::types::NormalizedRow;

const INSERT_MATCH: &str = r#"
INSERT INTO matches (competition, match_date, home_team, away_team, score, status)
VALUES (?, ?, ?, ?, ?, ?)
"#;

// The conflict target repeats the partial index predicate from schema.rs.
const UPSERT_MATCH: &str = r#"
INSERT INTO matches (competition, match_date, home_team, away_team, score, status)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT(competition, match_date, home_team, away_team)
    WHERE home_team <> 'TBD' AND away_team <> 'TBD'
DO UPDATE SET
    score = excluded.score,
    status = excluded.status
"#;

/// Undecided fixtures have no stable key, so preserve mode replaces the
/// competition's previous set wholesale instead of upserting them.
const DELETE_UNDECIDED: &str = r#"
DELETE FROM matches
WHERE competition = ? AND (home_team = 'TBD' OR away_team = 'TBD')
"#;

/// Persists one competition's rows per call, all-or-nothing.
#[derive(Clone)]
pub struct MatchWriter {
    pool: SqlitePool,
    mode: SchemaMode,
}

impl MatchWriter {
    pub fn new(pool: SqlitePool, mode: SchemaMode) -> Self {
        Self { pool, mode }
    }

    /// Inserts `rows` in order inside a single transaction and returns how many
    /// were written. Any failed insert rolls back the whole batch.
    pub async fn write(&self, rows: &[NormalizedRow], competition_name: &str) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        match self.insert_rows(&mut tx, rows).await {
            Ok(written) => {
                tx.commit().await?;
                info!(
                    competition = competition_name,
                    rows = written,
                    "Saved {written} matches for {competition_name}"
                );
                Ok(written)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(competition = competition_name, "Rollback failed: {rb}");
                }
                Err(e)
            }
        }
    }

    async fn insert_rows(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        rows: &[NormalizedRow],
    ) -> Result<u64, sqlx::Error> {
        if self.mode == SchemaMode::Preserve {
            let competitions: BTreeSet<&str> = rows.iter().map(|r| r.competition.as_str()).collect();
            for competition in competitions {
                sqlx::query(DELETE_UNDECIDED)
                    .bind(competition)
                    .execute(&mut **tx)
                    .await?;
            }
        }

        let mut written = 0u64;
        for row in rows {
            let sql = match self.mode {
                SchemaMode::Preserve if !row.has_placeholder_team() => UPSERT_MATCH,
                _ => INSERT_MATCH,
            };
            debug!(
                date = %row.match_date,
                home = %row.home_team,
                away = %row.away_team,
                score = %row.score,
                status = %row.status,
                "Inserting match"
            );
            let result = sqlx::query(sql)
                .bind(&row.competition)
                .bind(row.match_date)
                .bind(&row.home_team)
                .bind(&row.away_team)
                .bind(&row.score)
                .bind(&row.status)
                .execute(&mut **tx)
                .await?;
            written += result.rows_affected();
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::db::models::{count_matches, load_matches};
    use crate::db::{ensure_schema, memory_pool};

    fn row(home: &str, away: &str, score: &str) -> NormalizedRow {
        NormalizedRow {
            competition: "Premier League".to_string(),
            match_date: NaiveDate::from_ymd_opt(2024, 8, 17).unwrap(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            score: score.to_string(),
            status: "FINISHED".to_string(),
        }
    }

    async fn writer(mode: SchemaMode) -> (SqlitePool, MatchWriter) {
        let pool = memory_pool().await;
        ensure_schema(&pool, mode).await.unwrap();
        (pool.clone(), MatchWriter::new(pool, mode))
    }

    #[tokio::test]
    async fn written_rows_round_trip() {
        let (pool, writer) = writer(SchemaMode::Recreate).await;
        let rows = vec![
            row("Arsenal FC", "Wolverhampton Wanderers FC", "2-0"),
            row("Everton FC", "Brighton & Hove Albion FC", "0-3"),
            row("Newcastle United FC", "Southampton FC", "?-?"),
        ];

        let written = writer.write(&rows, "Premier League").await.unwrap();
        assert_eq!(written, 3);

        let stored = load_matches(&pool, "Premier League").await.unwrap();
        let round_tripped: Vec<NormalizedRow> = stored.iter().map(|r| r.to_row()).collect();
        assert_eq!(round_tripped, rows);
        assert!(stored.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn values_are_bound_not_interpolated() {
        let (pool, writer) = writer(SchemaMode::Recreate).await;
        let nasty = row("Robert'); DROP TABLE matches;--", "Fulham FC", "1-1");

        writer.write(std::slice::from_ref(&nasty), "Premier League").await.unwrap();

        let stored = load_matches(&pool, "Premier League").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].home_team, nasty.home_team);
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_whole_batch() {
        let (pool, writer) = writer(SchemaMode::Recreate).await;
        sqlx::query(
            "CREATE TRIGGER reject_second BEFORE INSERT ON matches
             WHEN NEW.home_team = 'Chelsea FC'
             BEGIN SELECT RAISE(ABORT, 'simulated connection drop'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let rows = vec![
            row("Brentford FC", "Crystal Palace FC", "2-1"),
            row("Chelsea FC", "Manchester City FC", "0-2"),
            row("Leicester City FC", "Tottenham Hotspur FC", "1-1"),
        ];

        let err = writer.write(&rows, "Premier League").await.unwrap_err();
        assert!(err.to_string().contains("simulated connection drop"));
        assert_eq!(count_matches(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn preserve_mode_upserts_on_fixture_key() {
        let (pool, writer) = writer(SchemaMode::Preserve).await;

        let mut scheduled = row("Aston Villa FC", "West Ham United FC", "?-?");
        scheduled.status = "TIMED".to_string();
        writer.write(std::slice::from_ref(&scheduled), "Premier League").await.unwrap();

        let mut finished = scheduled.clone();
        finished.score = "2-1".to_string();
        finished.status = "FINISHED".to_string();
        writer.write(std::slice::from_ref(&finished), "Premier League").await.unwrap();

        let stored = load_matches(&pool, "Premier League").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].to_row(), finished);
    }

    #[tokio::test]
    async fn preserve_mode_stores_every_undecided_fixture() {
        let (pool, writer) = writer(SchemaMode::Preserve).await;
        let undecided = || NormalizedRow {
            competition: "Champions League".to_string(),
            match_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            home_team: "TBD".to_string(),
            away_team: "TBD".to_string(),
            score: "?-?".to_string(),
            status: "TIMED".to_string(),
        };
        let rows = vec![undecided(), undecided(), undecided()];

        let written = writer.write(&rows, "Champions League").await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(load_matches(&pool, "Champions League").await.unwrap().len(), 3);

        // A rerun replaces the undecided set instead of piling up duplicates.
        let written = writer.write(&rows[..2], "Champions League").await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(load_matches(&pool, "Champions League").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn preserve_mode_keeps_decided_fixtures_next_to_undecided_ones() {
        let (pool, writer) = writer(SchemaMode::Preserve).await;
        let mut decided = row("Arsenal FC", "PSV", "7-1");
        decided.competition = "Champions League".to_string();
        let mut undecided = row("TBD", "TBD", "?-?");
        undecided.competition = "Champions League".to_string();

        writer.write(&[decided.clone(), undecided.clone()], "Champions League").await.unwrap();
        writer.write(&[decided, undecided], "Champions League").await.unwrap();

        assert_eq!(load_matches(&pool, "Champions League").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let pool = memory_pool().await;
        let writer = MatchWriter::new(pool, SchemaMode::Recreate);
        let res = writer.write(&[row("A", "B", "1-0")], "Premier League").await;
        assert!(res.is_err());
    }
}
