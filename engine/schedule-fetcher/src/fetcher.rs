use crate::config::ScheduleApiConfig;
use crate::source::ScheduleSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bye_weeks::{sort_by_week, Game, SeasonType};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Body of a schedule response. The endpoint answers with a bare array; the
/// wrapped form is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScheduleResponse {
    Games(Vec<Game>),
    Wrapped { data: Vec<Game> },
}

impl ScheduleResponse {
    pub fn into_games(self) -> Vec<Game> {
        match self {
            ScheduleResponse::Games(games) => games,
            ScheduleResponse::Wrapped { data } => data,
        }
    }
}

/// HTTP client for the NGS league schedule endpoint
pub struct NgsScheduleClient {
    config: ScheduleApiConfig,
    client: Client,
}

impl NgsScheduleClient {
    /// Create a new client
    pub fn new(config: ScheduleApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn season_url(&self, year: i32, season_type: SeasonType) -> String {
        format!(
            "{}/?season={}&seasonType={}",
            self.config.base_url.trim_end_matches('/'),
            year,
            season_type
        )
    }
}

#[async_trait]
impl ScheduleSource for NgsScheduleClient {
    async fn fetch_season(&self, year: i32, season_type: SeasonType) -> Result<Vec<Game>> {
        let url = self.season_url(year, season_type);
        info!("Fetching {} {} schedule from: {}", year, season_type, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {} {} schedule", year, season_type))?;

        if !response.status().is_success() {
            anyhow::bail!("Schedule request failed with status: {}", response.status());
        }

        let mut games = response
            .json::<ScheduleResponse>()
            .await
            .with_context(|| format!("Failed to parse {} {} schedule JSON", year, season_type))?
            .into_games();

        // Bye detection needs week order
        sort_by_week(&mut games);

        info!("Fetched {} games for {} {}", games.len(), year, season_type);
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> NgsScheduleClient {
        NgsScheduleClient::new(ScheduleApiConfig { base_url: base_url.to_string(), timeout_secs: 5 })
            .unwrap()
    }

    #[test]
    fn test_season_url() {
        let client = client("https://api.ngs.nfl.com/league/schedule/");
        assert_eq!(
            client.season_url(2018, SeasonType::Regular),
            "https://api.ngs.nfl.com/league/schedule/?season=2018&seasonType=REG"
        );
    }

    #[test]
    fn test_response_accepts_bare_and_wrapped_arrays() {
        let game = r#"{ "week": 4, "homeTeamAbbr": "CIN", "visitorTeamAbbr": "ATL", "score": null }"#;

        let bare: ScheduleResponse = serde_json::from_str(&format!("[{}]", game)).unwrap();
        assert_eq!(bare.into_games().len(), 1);

        let wrapped: ScheduleResponse =
            serde_json::from_str(&format!(r#"{{ "data": [{}, {}] }}"#, game, game)).unwrap();
        assert_eq!(wrapped.into_games().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        // Nothing listens on port 9 locally
        let client = client("http://127.0.0.1:9/league/schedule");
        let result = client.fetch_season(2018, SeasonType::Regular).await;
        assert!(result.is_err());
    }
}
