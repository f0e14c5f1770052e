//! Store trait shared by the loader and the query API

use crate::error::Result;
use bye_weeks::{Period, PostByeAverages, SeasonType};
use serde::{Deserialize, Serialize};

/// Keys of a (year, season type) pair once it exists in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonIds {
    pub season_id: i64,
    pub season_type_id: i64,
}

/// One row of the bye-week query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ByeWeekRow {
    pub week: i32,
}

/// One averages column for one bye week. `value` is `None` only for an
/// overtime average with no overtime games behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodAverage {
    pub period: Period,
    pub value: Option<f64>,
}

/// Persistence gateway.
///
/// Every write is an idempotent upsert keyed by natural key, so concurrent
/// season loads sharing one store never produce duplicate rows.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Create the season, its type and their pairing if missing
    async fn upsert_season(&self, year: i32, season_type: SeasonType) -> Result<SeasonIds>;

    /// Create the team if missing
    async fn upsert_team(&self, name: &str) -> Result<i64>;

    /// Record a team's bye week for a season; one row per team and season
    async fn upsert_bye_week(&self, week: i32, team_id: i64, season: SeasonIds) -> Result<i64>;

    /// Record post-bye averages; one row per bye week
    async fn upsert_post_bye_averages(
        &self,
        bye_week_id: i64,
        averages: &PostByeAverages,
    ) -> Result<()>;

    /// Remove the averages of a bye week that no longer has post-bye games.
    /// Returns whether a row was removed.
    async fn delete_post_bye_averages(&self, bye_week_id: i64) -> Result<bool>;

    /// Look a bye week up by team name and season
    async fn find_bye_week_id(&self, team: &str, season: SeasonIds) -> Result<Option<i64>>;

    async fn find_bye_weeks(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
    ) -> Result<Vec<ByeWeekRow>>;

    async fn find_post_bye_averages(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
        period: Period,
    ) -> Result<Vec<PeriodAverage>>;
}
