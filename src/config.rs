use std::str::FromStr;
use std::time::Duration;

use crate::db::SchemaMode;
use crate::error::{AppError, Result};
use crate::types::Competition;

pub const FOOTBALL_API_URL: &str = "https://api.football-data.org/v4";

/// Header carrying the football-data.org API key.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Request timeout when HTTP_TIMEOUT_SECS is unset.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_DB_PATH: &str = "football.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub db_path: String,
    pub log_level: String,
    pub http_timeout: Duration,
    /// Competitions processed at once (PIPELINE_CONCURRENCY), 1 = sequential.
    pub concurrency: usize,
    /// Drop-and-recreate or create-if-missing + upsert (SCHEMA_MODE).
    pub schema_mode: SchemaMode,
    /// Competitions to process, always in declared order (COMPETITIONS, comma-separated codes).
    pub competitions: Vec<Competition>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup so tests don't touch the process env.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("FOOTBALL_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Config("FOOTBALL_API_KEY must be set".to_string()))?;

        let http_timeout_secs = var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| AppError::Config("HTTP_TIMEOUT_SECS must be a positive whole number of seconds".to_string()))?;

        let schema_mode = var("SCHEMA_MODE")
            .map(|s| SchemaMode::from_str(&s).map_err(AppError::Config))
            .transpose()?
            .unwrap_or_default();

        let competitions = match var("COMPETITIONS") {
            Some(list) => parse_competitions(&list)?,
            None => Competition::ALL.to_vec(),
        };

        let concurrency = var("PIPELINE_CONCURRENCY")
            .unwrap_or_else(|| "1".to_string())
            .parse::<usize>()
            .map_err(|_| AppError::Config("PIPELINE_CONCURRENCY must be a positive integer".to_string()))?
            .clamp(1, Competition::ALL.len());

        Ok(Self {
            api_key,
            api_url: var("FOOTBALL_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| FOOTBALL_API_URL.to_string()),
            db_path: var("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            concurrency,
            schema_mode,
            competitions,
        })
    }
}

/// Parses a comma-separated code list. Unknown codes are an error; the result
/// follows declaration order regardless of how the list was written.
fn parse_competitions(list: &str) -> Result<Vec<Competition>> {
    let mut wanted = Vec::new();
    for code in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let competition = Competition::from_str(code).map_err(AppError::Config)?;
        wanted.push(competition);
    }
    if wanted.is_empty() {
        return Err(AppError::Config("COMPETITIONS must name at least one competition".to_string()));
    }
    Ok(Competition::ALL
        .iter()
        .copied()
        .filter(|c| wanted.contains(c))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc")]).unwrap();
        assert_eq!(cfg.api_key, "abc");
        assert_eq!(cfg.api_url, FOOTBALL_API_URL);
        assert_eq!(cfg.db_path, DEFAULT_DB_PATH);
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.schema_mode, SchemaMode::Recreate);
        assert_eq!(cfg.competitions, Competition::ALL.to_vec());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
        assert!(matches!(config_from(&[("FOOTBALL_API_KEY", "  ")]), Err(AppError::Config(_))));
    }

    #[test]
    fn competitions_keep_declared_order() {
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc"), ("COMPETITIONS", "CL, PL,sa")]).unwrap();
        assert_eq!(
            cfg.competitions,
            vec![Competition::PremierLeague, Competition::SerieA, Competition::ChampionsLeague]
        );
    }

    #[test]
    fn unknown_competition_is_rejected() {
        let err = config_from(&[("FOOTBALL_API_KEY", "abc"), ("COMPETITIONS", "PL,XX")]);
        assert!(matches!(err, Err(AppError::Config(_))));
    }

    #[test]
    fn concurrency_is_clamped() {
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc"), ("PIPELINE_CONCURRENCY", "64")]).unwrap();
        assert_eq!(cfg.concurrency, Competition::ALL.len());
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc"), ("PIPELINE_CONCURRENCY", "0")]).unwrap();
        assert_eq!(cfg.concurrency, 1);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_api_url() {
        let cfg = config_from(&[
            ("FOOTBALL_API_KEY", "abc"),
            ("FOOTBALL_API_URL", "http://localhost:8080/v4/"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://localhost:8080/v4");
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        for bad in ["0", "ten", "-5"] {
            let err = config_from(&[("FOOTBALL_API_KEY", "abc"), ("HTTP_TIMEOUT_SECS", bad)]);
            assert!(matches!(err, Err(AppError::Config(_))), "accepted HTTP_TIMEOUT_SECS={bad}");
        }
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc"), ("HTTP_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_schema_mode_is_rejected() {
        let err = config_from(&[("FOOTBALL_API_KEY", "abc"), ("SCHEMA_MODE", "truncate")]);
        assert!(matches!(err, Err(AppError::Config(_))));
        let cfg = config_from(&[("FOOTBALL_API_KEY", "abc"), ("SCHEMA_MODE", "preserve")]).unwrap();
        assert_eq!(cfg.schema_mode, SchemaMode::Preserve);
    }
}
