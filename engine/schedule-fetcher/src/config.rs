use serde::{Deserialize, Serialize};

/// Configuration for the schedule fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Schedule API configuration
    pub schedule_api: ScheduleApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleApiConfig {
    /// Base URL of the league schedule endpoint
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            schedule_api: ScheduleApiConfig {
                base_url: "https://api.ngs.nfl.com/league/schedule".to_string(),
                timeout_secs: 30,
            },
        }
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("SCHEDULE_API_BASE_URL") {
            config.schedule_api.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(timeout) = std::env::var("SCHEDULE_API_TIMEOUT_SECS") {
            config.schedule_api.timeout_secs = timeout
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid SCHEDULE_API_TIMEOUT_SECS: {}", timeout))?;
        }

        Ok(config)
    }
}
