use std::future::Future;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::{Config, AUTH_HEADER};
use crate::error::{FetchError, Result};
use crate::types::{Competition, MatchesResponse, RawMatch};

/// Anything that can produce the raw fixtures of one competition.
pub trait MatchSource {
    fn fetch(
        &self,
        competition: Competition,
    ) -> impl Future<Output = std::result::Result<Vec<RawMatch>, FetchError>> + Send;
}

/// football-data.org client. One GET per competition, no retries.
pub struct MatchFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MatchFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn matches_url(&self, competition: Competition) -> String {
        format!("{}/competitions/{}/matches", self.base_url, competition.code())
    }
}

impl MatchSource for MatchFetcher {
    async fn fetch(&self, competition: Competition) -> std::result::Result<Vec<RawMatch>, FetchError> {
        let url = self.matches_url(competition);
        debug!(competition = competition.code(), %url, "Requesting matches");

        let resp = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            warn!(
                competition = competition.code(),
                status = status.as_u16(),
                "API error for {}: HTTP {} {}",
                competition.code(),
                status.as_u16(),
                body,
            );
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        let parsed = parse_matches(&body)?;
        info!(
            competition = competition.code(),
            matches = parsed.len(),
            "Fetched {} matches for {}",
            parsed.len(),
            competition.name(),
        );
        Ok(parsed)
    }
}

/// Extracts the `matches` array from a 200 body. A missing array, a wrong
/// shape, or an unparseable field is reported with serde's detail.
pub fn parse_matches(body: &str) -> std::result::Result<Vec<RawMatch>, FetchError> {
    serde_json::from_str::<MatchesResponse>(body)
        .map(|r| r.matches)
        .map_err(|e| FetchError::Malformed(e.to_string()))
}
