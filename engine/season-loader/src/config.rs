use bye_weeks::SeasonType;
use persistence::DatabaseConfig;
use schedule_fetcher::FetcherConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the season loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Schedule API configuration
    pub fetcher: FetcherConfig,

    /// Which seasons to seed
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Season years; the schedule API carries no scores before 2014
    pub years: Vec<i32>,

    pub season_type: SeasonType,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { years: vec![2014, 2015, 2016, 2017, 2018], season_type: SeasonType::Regular }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut seed = SeedConfig::default();

        if let Ok(years) = std::env::var("SEED_YEARS") {
            seed.years = parse_years(&years)?;
        }

        if let Ok(season_type) = std::env::var("SEED_SEASON_TYPE") {
            seed.season_type = season_type.parse()?;
        }

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            fetcher: FetcherConfig::from_env()?,
            seed,
        })
    }
}

/// Parse a comma-separated year list such as `2014,2015,2016`
pub fn parse_years(raw: &str) -> anyhow::Result<Vec<i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(|year| {
            year.parse::<i32>()
                .map_err(|_| anyhow::anyhow!("Invalid season year: {}", year))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_years() {
        assert_eq!(parse_years("2014, 2015,2016,").unwrap(), vec![2014, 2015, 2016]);
        assert!(parse_years("2014,twenty").is_err());
    }

    #[test]
    fn test_default_seed_covers_scored_seasons() {
        let seed = SeedConfig::default();
        assert_eq!(seed.years.first(), Some(&2014));
        assert_eq!(seed.season_type, SeasonType::Regular);
    }
}
