use std::collections::BTreeMap;

use futures_util::stream::{self, StreamExt};
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::models::count_by_competition;
use crate::db::{ensure_schema, MatchWriter, SchemaMode};
use crate::fetcher::MatchSource;
use crate::report::{CompetitionOutcome, CompetitionReport, NoDataReason, RunReport};
use crate::types::{normalize, Competition, NormalizedRow};

/// Runs fetch → normalize → write for each configured competition.
pub struct Pipeline<S> {
    source: S,
    writer: MatchWriter,
    pool: SqlitePool,
    schema_mode: SchemaMode,
    competitions: Vec<Competition>,
    concurrency: usize,
}

impl<S: MatchSource> Pipeline<S> {
    pub fn new(cfg: &Config, source: S, pool: SqlitePool) -> Self {
        Self {
            source,
            writer: MatchWriter::new(pool.clone(), cfg.schema_mode),
            pool,
            schema_mode: cfg.schema_mode,
            competitions: cfg.competitions.clone(),
            concurrency: cfg.concurrency.max(1),
        }
    }

    /// One full run. Never fails as a whole: schema and per-competition errors
    /// are logged and folded into the report.
    pub async fn run_all(&self) -> RunReport {
        let schema_ready = match ensure_schema(&self.pool, self.schema_mode).await {
            Ok(()) => true,
            Err(e) => {
                error!("Schema setup failed, inserts will likely fail: {e}");
                false
            }
        };

        // `buffered` yields in input order, so the report follows declaration order.
        let competitions: Vec<CompetitionReport> = stream::iter(self.competitions.iter().copied())
            .map(|competition| self.process_competition(competition))
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = RunReport { schema_ready, competitions };
        self.log_summary(&report).await;
        report
    }

    pub async fn process_competition(&self, competition: Competition) -> CompetitionReport {
        info!(competition = competition.code(), "Processing {}", competition.name());

        let outcome = match self.source.fetch(competition).await {
            Err(e) if e.is_no_data() => {
                warn!(competition = competition.code(), "No data available for {}: {e}", competition.name());
                CompetitionOutcome::NoData(NoDataReason::Unavailable(e.to_string()))
            }
            Err(e) => {
                error!(competition = competition.code(), "Unusable response for {}: {e}", competition.name());
                CompetitionOutcome::FetchFailed(e.to_string())
            }
            Ok(raw) if raw.is_empty() => {
                info!(competition = competition.code(), "No matches returned for {}", competition.name());
                CompetitionOutcome::NoData(NoDataReason::Empty)
            }
            Ok(raw) => {
                let rows: Vec<NormalizedRow> = raw.iter().map(|m| normalize(m, competition)).collect();
                log_status_breakdown(competition, &rows);

                match self.writer.write(&rows, competition.name()).await {
                    Ok(written) => CompetitionOutcome::Written { rows: written },
                    Err(e) => {
                        error!(competition = competition.code(), "Failed to save {}: {e}", competition.name());
                        CompetitionOutcome::WriteFailed(e.to_string())
                    }
                }
            }
        };

        CompetitionReport { competition, outcome }
    }

    async fn log_summary(&self, report: &RunReport) {
        for c in &report.competitions {
            info!(competition = c.competition.code(), "{}: {}", c.competition.name(), c.outcome);
        }

        match count_by_competition(&self.pool).await {
            Ok(counts) => {
                for c in counts {
                    debug!(competition = %c.competition, rows = c.matches, "Stored rows");
                }
            }
            Err(e) => warn!("Could not read back stored row counts: {e}"),
        }

        info!(
            status = %report.status(),
            rows = report.rows_written(),
            schema_ready = report.schema_ready,
            "Run finished: {} ({} rows written)",
            report.status(),
            report.rows_written(),
        );
    }
}

/// Match count per status, e.g. FINISHED=280 TIMED=100.
pub fn status_breakdown(rows: &[NormalizedRow]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.status.as_str()).or_insert(0) += 1;
    }
    counts
}

fn log_status_breakdown(competition: Competition, rows: &[NormalizedRow]) {
    let breakdown = status_breakdown(rows)
        .iter()
        .map(|(status, n)| format!("{status}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        competition = competition.code(),
        matches = rows.len(),
        "{}: {} matches | {}",
        competition.name(),
        rows.len(),
        breakdown,
    );
}
