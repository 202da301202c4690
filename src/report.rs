//! Per-competition outcomes and the aggregated run status.

use crate::types::Competition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    /// The API answered 200 with an empty `matches` array.
    Empty,
    /// Non-200 status or a transport failure; the detail was logged.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompetitionOutcome {
    Written { rows: u64 },
    NoData(NoDataReason),
    /// The response could not be mapped; needs a human to look at the API.
    FetchFailed(String),
    /// The batch was rolled back.
    WriteFailed(String),
}

impl CompetitionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CompetitionOutcome::FetchFailed(_) | CompetitionOutcome::WriteFailed(_))
    }
}

impl std::fmt::Display for CompetitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionOutcome::Written { rows } => write!(f, "written ({rows} rows)"),
            CompetitionOutcome::NoData(NoDataReason::Empty) => write!(f, "no data (no matches)"),
            CompetitionOutcome::NoData(NoDataReason::Unavailable(e)) => write!(f, "no data ({e})"),
            CompetitionOutcome::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            CompetitionOutcome::WriteFailed(e) => write!(f, "write failed: {e}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompetitionReport {
    pub competition: Competition,
    pub outcome: CompetitionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Schema ready and no competition failed. "No data" counts as success.
    Success,
    /// Some competitions failed, or the schema setup failed.
    PartialFailure,
    TotalFailure,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::TotalFailure => 1,
            RunStatus::PartialFailure => 2,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Success => "success",
            RunStatus::PartialFailure => "partial failure",
            RunStatus::TotalFailure => "total failure",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// False when schema setup failed; writes were still attempted.
    pub schema_ready: bool,
    /// In processing order.
    pub competitions: Vec<CompetitionReport>,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        let failed = self.competitions.iter().filter(|c| c.outcome.is_failure()).count();
        if failed == 0 && self.schema_ready {
            RunStatus::Success
        } else if failed == self.competitions.len() {
            RunStatus::TotalFailure
        } else {
            RunStatus::PartialFailure
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.competitions
            .iter()
            .map(|c| match c.outcome {
                CompetitionOutcome::Written { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome(&self, competition: Competition) -> Option<&CompetitionOutcome> {
        self.competitions
            .iter()
            .find(|c| c.competition == competition)
            .map(|c| &c.outcome)
    }
}
