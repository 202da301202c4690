use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::str::FromStr;

/// Rendered in place of a missing full-time goal count.
pub const SCORE_PLACEHOLDER: &str = "?";

/// Rendered in place of a team that has not been decided yet (knockout draws).
pub const TEAM_PLACEHOLDER: &str = "TBD";

// ---------------------------------------------------------------------------
// Competition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Competition {
    PremierLeague,
    Bundesliga,
    SerieA,
    LaLiga,
    Ligue1,
    ChampionsLeague,
}

impl Competition {
    /// Every competition, in the order runs process them.
    pub const ALL: [Competition; 6] = [
        Competition::PremierLeague,
        Competition::Bundesliga,
        Competition::SerieA,
        Competition::LaLiga,
        Competition::Ligue1,
        Competition::ChampionsLeague,
    ];

    /// football-data.org competition code.
    pub fn code(self) -> &'static str {
        match self {
            Competition::PremierLeague => "PL",
            Competition::Bundesliga => "BL1",
            Competition::SerieA => "SA",
            Competition::LaLiga => "PD",
            Competition::Ligue1 => "FL1",
            Competition::ChampionsLeague => "CL",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Competition::PremierLeague => "Premier League",
            Competition::Bundesliga => "Bundesliga",
            Competition::SerieA => "Serie A",
            Competition::LaLiga => "La Liga",
            Competition::Ligue1 => "Ligue 1",
            Competition::ChampionsLeague => "Champions League",
        }
    }
}

impl std::fmt::Display for Competition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl FromStr for Competition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Competition::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown competition code: {s}"))
    }
}

// ---------------------------------------------------------------------------
// API payload
// ---------------------------------------------------------------------------

/// Body of `GET /competitions/{code}/matches`. Everything besides `matches`
/// (filters, resultSet, competition) is ignored.
#[derive(Debug, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<RawMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub utc_date: DateTime<Utc>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub score: Score,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRef {
    /// Null until a knockout slot is decided.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub full_time: FullTime,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FullTime {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

// ---------------------------------------------------------------------------
// Normalized rows
// ---------------------------------------------------------------------------

/// One match flattened into the shape of the `matches` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub competition: String,
    pub match_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    pub status: String,
}

impl NormalizedRow {
    pub fn has_placeholder_team(&self) -> bool {
        self.home_team == TEAM_PLACEHOLDER || self.away_team == TEAM_PLACEHOLDER
    }
}

pub fn normalize(raw: &RawMatch, competition: Competition) -> NormalizedRow {
    NormalizedRow {
        competition: competition.name().to_string(),
        match_date: raw.utc_date.date_naive(),
        home_team: team_name(&raw.home_team),
        away_team: team_name(&raw.away_team),
        score: format_score(raw.score.full_time),
        status: raw.status.clone(),
    }
}

/// `"{home}-{away}"`; a side without a full-time count renders as `?`.
pub fn format_score(ft: FullTime) -> String {
    let side = |goals: Option<u32>| match goals {
        Some(g) => g.to_string(),
        None => SCORE_PLACEHOLDER.to_string(),
    };
    format!("{}-{}", side(ft.home), side(ft.away))
}

fn team_name(team: &TeamRef) -> String {
    team.name
        .clone()
        .unwrap_or_else(|| TEAM_PLACEHOLDER.to_string())
}
