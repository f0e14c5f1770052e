//! In-process store with the same upsert semantics as [`crate::PgStore`]

use crate::error::{Result, StoreError};
use crate::store::{ByeWeekRow, PeriodAverage, SeasonIds, StatsStore};
use bye_weeks::{round2, Period, PostByeAverages, SeasonType};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    seasons: BTreeMap<i32, i64>,
    season_types: BTreeMap<SeasonType, i64>,
    full_years: BTreeSet<(i64, i64)>,
    teams: BTreeMap<String, i64>,
    /// (team_id, season_id, season_type_id) -> (bye_week_id, week)
    bye_weeks: BTreeMap<(i64, i64, i64), (i64, i32)>,
    /// bye_week_id -> averages
    points_after_bye: BTreeMap<i64, PostByeAverages>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn bye_week_id(&self, team: &str, year: i32, season_type: SeasonType) -> Option<i64> {
        let team_id = self.teams.get(team)?;
        let season_id = self.seasons.get(&year)?;
        let season_type_id = self.season_types.get(&season_type)?;
        self.bye_weeks
            .get(&(*team_id, *season_id, *season_type_id))
            .map(|(id, _)| *id)
    }
}

/// Store held in memory; used by tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bye_week_count(&self) -> usize {
        self.tables.read().await.bye_weeks.len()
    }

    pub async fn averages_count(&self) -> usize {
        self.tables.read().await.points_after_bye.len()
    }

    pub async fn team_count(&self) -> usize {
        self.tables.read().await.teams.len()
    }
}

fn check_finite(column: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(round2(value))
    } else {
        Err(StoreError::invalid_value(format!("{} = {}", column, value)))
    }
}

#[async_trait::async_trait]
impl StatsStore for InMemoryStore {
    async fn upsert_season(&self, year: i32, season_type: SeasonType) -> Result<SeasonIds> {
        let mut tables = self.tables.write().await;

        let season_id = match tables.seasons.get(&year) {
            Some(id) => *id,
            None => {
                let id = tables.allocate_id();
                tables.seasons.insert(year, id);
                id
            }
        };

        let season_type_id = match tables.season_types.get(&season_type) {
            Some(id) => *id,
            None => {
                let id = tables.allocate_id();
                tables.season_types.insert(season_type, id);
                id
            }
        };

        tables.full_years.insert((season_id, season_type_id));
        Ok(SeasonIds { season_id, season_type_id })
    }

    async fn upsert_team(&self, name: &str) -> Result<i64> {
        let mut tables = self.tables.write().await;
        if let Some(id) = tables.teams.get(name) {
            return Ok(*id);
        }
        let id = tables.allocate_id();
        tables.teams.insert(name.to_string(), id);
        Ok(id)
    }

    async fn upsert_bye_week(&self, week: i32, team_id: i64, season: SeasonIds) -> Result<i64> {
        let mut tables = self.tables.write().await;

        if !tables.teams.values().any(|id| *id == team_id) {
            return Err(StoreError::not_found(format!("team {}", team_id)));
        }

        let key = (team_id, season.season_id, season.season_type_id);
        if let Some((id, stored_week)) = tables.bye_weeks.get_mut(&key) {
            *stored_week = week;
            return Ok(*id);
        }

        let id = tables.allocate_id();
        tables.bye_weeks.insert(key, (id, week));
        Ok(id)
    }

    async fn upsert_post_bye_averages(
        &self,
        bye_week_id: i64,
        averages: &PostByeAverages,
    ) -> Result<()> {
        let stored = PostByeAverages {
            total_avg: check_finite("total_avg", averages.total_avg)?,
            first_quarter: check_finite("first_quarter", averages.first_quarter)?,
            second_quarter: check_finite("second_quarter", averages.second_quarter)?,
            third_quarter: check_finite("third_quarter", averages.third_quarter)?,
            fourth_quarter: check_finite("fourth_quarter", averages.fourth_quarter)?,
            overtime: averages
                .overtime
                .map(|value| check_finite("overtime", value))
                .transpose()?,
        };

        let mut tables = self.tables.write().await;
        if !tables.bye_weeks.values().any(|(id, _)| *id == bye_week_id) {
            return Err(StoreError::not_found(format!("bye week {}", bye_week_id)));
        }
        tables.points_after_bye.insert(bye_week_id, stored);
        Ok(())
    }

    async fn delete_post_bye_averages(&self, bye_week_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.points_after_bye.remove(&bye_week_id).is_some())
    }

    async fn find_bye_week_id(&self, team: &str, season: SeasonIds) -> Result<Option<i64>> {
        let tables = self.tables.read().await;
        let id = tables.teams.get(team).and_then(|team_id| {
            tables
                .bye_weeks
                .get(&(*team_id, season.season_id, season.season_type_id))
                .map(|(id, _)| *id)
        });
        Ok(id)
    }

    async fn find_bye_weeks(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
    ) -> Result<Vec<ByeWeekRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .bye_week_id(team, year, season_type)
            .and_then(|id| tables.bye_weeks.values().find(|(bye_id, _)| *bye_id == id))
            .map(|(_, week)| vec![ByeWeekRow { week: *week }])
            .unwrap_or_default();
        Ok(rows)
    }

    async fn find_post_bye_averages(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
        period: Period,
    ) -> Result<Vec<PeriodAverage>> {
        let tables = self.tables.read().await;
        let rows = tables
            .bye_week_id(team, year, season_type)
            .and_then(|id| tables.points_after_bye.get(&id))
            .map(|averages| vec![PeriodAverage { period, value: averages.get(period) }])
            .unwrap_or_default();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages() -> PostByeAverages {
        PostByeAverages {
            total_avg: 23.63,
            first_quarter: 2.5,
            second_quarter: 8.13,
            third_quarter: 5.0,
            fourth_quarter: 7.63,
            overtime: None,
        }
    }

    #[tokio::test]
    async fn test_upserts_are_idempotent() {
        let store = InMemoryStore::new();

        let season = store.upsert_season(2018, SeasonType::Regular).await.unwrap();
        assert_eq!(store.upsert_season(2018, SeasonType::Regular).await.unwrap(), season);

        let phi = store.upsert_team("PHI").await.unwrap();
        assert_eq!(store.upsert_team("PHI").await.unwrap(), phi);

        let bye = store.upsert_bye_week(9, phi, season).await.unwrap();
        assert_eq!(store.upsert_bye_week(9, phi, season).await.unwrap(), bye);

        store.upsert_post_bye_averages(bye, &averages()).await.unwrap();
        store.upsert_post_bye_averages(bye, &averages()).await.unwrap();

        assert_eq!(store.team_count().await, 1);
        assert_eq!(store.bye_week_count().await, 1);
        assert_eq!(store.averages_count().await, 1);
    }

    #[tokio::test]
    async fn test_season_types_are_kept_apart() {
        let store = InMemoryStore::new();
        let regular = store.upsert_season(2018, SeasonType::Regular).await.unwrap();
        let post = store.upsert_season(2018, SeasonType::Postseason).await.unwrap();
        assert_eq!(regular.season_id, post.season_id);
        assert_ne!(regular.season_type_id, post.season_type_id);

        let phi = store.upsert_team("PHI").await.unwrap();
        store.upsert_bye_week(9, phi, regular).await.unwrap();

        let rows = store.find_bye_weeks("PHI", 2018, SeasonType::Regular).await.unwrap();
        assert_eq!(rows, vec![ByeWeekRow { week: 9 }]);
        assert!(store.find_bye_weeks("PHI", 2018, SeasonType::Postseason).await.unwrap().is_empty());
        assert_eq!(store.find_bye_week_id("PHI", post).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_post_bye_averages_by_period() {
        let store = InMemoryStore::new();
        let season = store.upsert_season(2018, SeasonType::Regular).await.unwrap();
        let phi = store.upsert_team("PHI").await.unwrap();
        let bye = store.upsert_bye_week(9, phi, season).await.unwrap();
        store.upsert_post_bye_averages(bye, &averages()).await.unwrap();

        let total = store
            .find_post_bye_averages("PHI", 2018, SeasonType::Regular, Period::TotalAvg)
            .await
            .unwrap();
        assert_eq!(total, vec![PeriodAverage { period: Period::TotalAvg, value: Some(23.63) }]);

        let overtime = store
            .find_post_bye_averages("PHI", 2018, SeasonType::Regular, Period::Overtime)
            .await
            .unwrap();
        assert_eq!(overtime[0].value, None);

        let missing = store
            .find_post_bye_averages("CAR", 2018, SeasonType::Regular, Period::TotalAvg)
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_nan_average_is_refused() {
        let store = InMemoryStore::new();
        let season = store.upsert_season(2018, SeasonType::Regular).await.unwrap();
        let phi = store.upsert_team("PHI").await.unwrap();
        let bye = store.upsert_bye_week(9, phi, season).await.unwrap();

        let bad = PostByeAverages { overtime: Some(f64::NAN), ..averages() };
        let err = store.upsert_post_bye_averages(bye, &bad).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue(_)));
        assert_eq!(store.averages_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_post_bye_averages() {
        let store = InMemoryStore::new();
        let season = store.upsert_season(2018, SeasonType::Regular).await.unwrap();
        let phi = store.upsert_team("PHI").await.unwrap();
        let bye = store.upsert_bye_week(9, phi, season).await.unwrap();
        store.upsert_post_bye_averages(bye, &averages()).await.unwrap();

        assert!(store.delete_post_bye_averages(bye).await.unwrap());
        assert!(!store.delete_post_bye_averages(bye).await.unwrap());
        assert_eq!(store.averages_count().await, 0);
        assert_eq!(store.bye_week_count().await, 1);

        let total = store
            .find_post_bye_averages("PHI", 2018, SeasonType::Regular, Period::TotalAvg)
            .await
            .unwrap();
        assert!(total.is_empty());
    }

    #[tokio::test]
    async fn test_averages_need_an_existing_bye_week() {
        let store = InMemoryStore::new();
        let err = store.upsert_post_bye_averages(42, &averages()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
