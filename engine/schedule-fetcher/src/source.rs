use anyhow::Result;
use async_trait::async_trait;
use bye_weeks::{sort_by_week, Game, SeasonType};
use std::collections::HashMap;

/// Anything that can produce a season's schedule
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Every game of `year`/`season_type`, sorted by week
    async fn fetch_season(&self, year: i32, season_type: SeasonType) -> Result<Vec<Game>>;
}

/// Schedule held in memory, for dry runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticScheduleSource {
    seasons: HashMap<(i32, SeasonType), Vec<Game>>,
}

impl StaticScheduleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_season(mut self, year: i32, season_type: SeasonType, games: Vec<Game>) -> Self {
        self.seasons.insert((year, season_type), games);
        self
    }
}

#[async_trait]
impl ScheduleSource for StaticScheduleSource {
    async fn fetch_season(&self, year: i32, season_type: SeasonType) -> Result<Vec<Game>> {
        let mut games = self
            .seasons
            .get(&(year, season_type))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No schedule for {} {}", year, season_type))?;
        sort_by_week(&mut games);
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(week: u32, home: &str, visitor: &str) -> Game {
        Game {
            week,
            home_team_abbr: home.to_string(),
            visitor_team_abbr: visitor.to_string(),
            score: None,
        }
    }

    #[test]
    fn test_static_source_sorts_by_week() {
        let source = StaticScheduleSource::new().with_season(
            2018,
            SeasonType::Regular,
            vec![game(3, "PHI", "IND"), game(1, "PHI", "ATL"), game(2, "TB", "PHI")],
        );

        let games = tokio_test::block_on(source.fetch_season(2018, SeasonType::Regular)).unwrap();
        let weeks: Vec<u32> = games.iter().map(|g| g.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_static_source_missing_season_is_an_error() {
        let source = StaticScheduleSource::new();
        let err = source.fetch_season(2013, SeasonType::Regular).await.unwrap_err();
        assert!(err.to_string().contains("2013 REG"));
    }
}
