use crate::outcome::{LoadStage, RowFailure, SeasonOutcome, SeasonReport};
use bye_weeks::{aggregate_season, PostByeAverages, SeasonType};
use futures::future::join_all;
use persistence::{SeasonIds, StatsStore, StoreError};
use schedule_fetcher::ScheduleSource;
use std::sync::Arc;
use tracing::{debug, info};

/// Drives fetch, aggregation and persistence for whole seasons
pub struct SeasonLoader {
    source: Arc<dyn ScheduleSource>,
    store: Arc<dyn StatsStore>,
}

impl SeasonLoader {
    pub fn new(source: Arc<dyn ScheduleSource>, store: Arc<dyn StatsStore>) -> Self {
        Self { source, store }
    }

    /// Load several seasons concurrently. Each season keeps its own state;
    /// one failing does not affect the others.
    pub async fn load_seasons(&self, years: &[i32], season_type: SeasonType) -> Vec<SeasonReport> {
        join_all(years.iter().map(|year| self.load_season(*year, season_type))).await
    }

    /// Fetch, aggregate and persist one season
    pub async fn load_season(&self, year: i32, season_type: SeasonType) -> SeasonReport {
        info!("Loading {} {} season", year, season_type);
        let outcome = self.run(year, season_type).await;
        let report = SeasonReport::new(year, season_type, outcome);
        report.log();
        report
    }

    async fn run(&self, year: i32, season_type: SeasonType) -> SeasonOutcome {
        let games = match self.source.fetch_season(year, season_type).await {
            Ok(games) => games,
            Err(e) => {
                return SeasonOutcome::Failed { stage: LoadStage::Fetch, error: format!("{:#}", e) }
            }
        };

        let aggregate = aggregate_season(&games);
        debug!(
            "{} {}: {} games, {} byes, {} teams with post-bye games",
            year,
            season_type,
            games.len(),
            aggregate.byes.len(),
            aggregate.totals.len()
        );

        let season = match self.store.upsert_season(year, season_type).await {
            Ok(season) => season,
            Err(e) => return SeasonOutcome::Failed { stage: LoadStage::Season, error: e.to_string() },
        };

        let mut failures = Vec::new();

        let mut byes = 0;
        for bye in &aggregate.byes {
            match self.store_bye_week(&bye.team, bye.week, season).await {
                Ok(_) => byes += 1,
                Err((stage, e)) => failures.push(RowFailure {
                    team: bye.team.clone(),
                    stage,
                    error: e.to_string(),
                }),
            }
        }

        let team_averages = aggregate.averages();
        let mut averages = 0;
        for bye in &aggregate.byes {
            match self.store_averages(&bye.team, team_averages.get(&bye.team), season).await {
                Ok(true) => averages += 1,
                Ok(false) => {}
                Err(e) => failures.push(RowFailure {
                    team: bye.team.clone(),
                    stage: LoadStage::Averages,
                    error: e.to_string(),
                }),
            }
        }

        if failures.is_empty() {
            SeasonOutcome::Complete { byes, averages }
        } else {
            SeasonOutcome::Partial { byes, averages, failures }
        }
    }

    /// Write a team's averages, or clear them when it has no post-bye games
    /// this time. Returns whether averages were written.
    async fn store_averages(
        &self,
        team: &str,
        averages: Option<&PostByeAverages>,
        season: SeasonIds,
    ) -> Result<bool, StoreError> {
        let bye_week_id = match (self.store.find_bye_week_id(team, season).await?, averages) {
            (Some(id), _) => id,
            (None, Some(_)) => return Err(StoreError::not_found(format!("bye week for {}", team))),
            (None, None) => return Ok(false),
        };

        match averages {
            Some(averages) => {
                self.store.upsert_post_bye_averages(bye_week_id, averages).await?;
                Ok(true)
            }
            None => {
                if self.store.delete_post_bye_averages(bye_week_id).await? {
                    debug!("Removed stale post-bye averages for {}", team);
                }
                Ok(false)
            }
        }
    }

    async fn store_bye_week(
        &self,
        team: &str,
        week: u32,
        season: SeasonIds,
    ) -> Result<i64, (LoadStage, StoreError)> {
        let team_id = self
            .store
            .upsert_team(team)
            .await
            .map_err(|e| (LoadStage::Team, e))?;

        let week = i32::try_from(week).map_err(|_| {
            (LoadStage::ByeWeek, StoreError::invalid_value(format!("week {}", week)))
        })?;

        self.store
            .upsert_bye_week(week, team_id, season)
            .await
            .map_err(|e| (LoadStage::ByeWeek, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bye_weeks::{Game, GameScore, Period, PostByeAverages, TeamScore};
    use persistence::{ByeWeekRow, InMemoryStore, PeriodAverage};
    use schedule_fetcher::StaticScheduleSource;

    fn side(q: [u32; 4]) -> TeamScore {
        TeamScore {
            point_total: q.iter().sum(),
            point_q1: q[0],
            point_q2: q[1],
            point_q3: q[2],
            point_q4: q[3],
            point_ot: 0,
        }
    }

    fn game(week: u32, home: &str, visitor: &str, home_q: [u32; 4], visitor_q: [u32; 4]) -> Game {
        Game {
            week,
            home_team_abbr: home.to_string(),
            visitor_team_abbr: visitor.to_string(),
            score: Some(GameScore {
                phase: "FINAL".to_string(),
                home_team_score: side(home_q),
                visitor_team_score: side(visitor_q),
            }),
        }
    }

    fn create_test_season() -> Vec<Game> {
        vec![
            game(1, "PHI", "ATL", [0, 3, 7, 8], [3, 3, 0, 6]),
            game(1, "CAR", "DAL", [3, 6, 0, 7], [0, 0, 8, 0]),
            game(2, "PHI", "CAR", [7, 7, 0, 7], [3, 0, 7, 7]),
            game(3, "ATL", "DAL", [0, 10, 7, 0], [7, 0, 7, 7]),
            game(4, "DAL", "PHI", [7, 0, 0, 3], [3, 7, 0, 7]),
            game(4, "ATL", "CAR", [7, 7, 7, 0], [0, 14, 3, 7]),
        ]
    }

    fn loader(store: Arc<dyn StatsStore>) -> SeasonLoader {
        let source = StaticScheduleSource::new()
            .with_season(2018, SeasonType::Regular, create_test_season())
            .with_season(2017, SeasonType::Regular, create_test_season());
        SeasonLoader::new(Arc::new(source), store)
    }

    #[tokio::test]
    async fn test_load_season_persists_byes_and_averages() {
        let store = Arc::new(InMemoryStore::new());
        let report = loader(store.clone()).load_season(2018, SeasonType::Regular).await;

        assert_eq!(report.outcome, SeasonOutcome::Complete { byes: 4, averages: 4 });
        assert_eq!(store.bye_week_count().await, 4);
        assert_eq!(store.averages_count().await, 4);

        let rows = store.find_bye_weeks("CAR", 2018, SeasonType::Regular).await.unwrap();
        assert_eq!(rows, vec![ByeWeekRow { week: 3 }]);

        // ATL rested in week 2: week 3 home (17) and week 4 home (21)
        let total = store
            .find_post_bye_averages("ATL", 2018, SeasonType::Regular, Period::TotalAvg)
            .await
            .unwrap();
        assert_eq!(total, vec![PeriodAverage { period: Period::TotalAvg, value: Some(19.0) }]);
    }

    #[tokio::test]
    async fn test_loading_twice_creates_no_duplicates() {
        let store = Arc::new(InMemoryStore::new());
        let loader = loader(store.clone());

        loader.load_season(2018, SeasonType::Regular).await;
        let second = loader.load_season(2018, SeasonType::Regular).await;

        assert!(matches!(second.outcome, SeasonOutcome::Complete { .. }));
        assert_eq!(store.bye_week_count().await, 4);
        assert_eq!(store.averages_count().await, 4);
        assert_eq!(store.team_count().await, 4);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let report = loader(store.clone()).load_season(2013, SeasonType::Regular).await;

        assert!(report.is_failed());
        assert!(matches!(report.outcome, SeasonOutcome::Failed { stage: LoadStage::Fetch, .. }));
        assert_eq!(store.bye_week_count().await, 0);
        assert_eq!(store.team_count().await, 0);
    }

    #[tokio::test]
    async fn test_seasons_load_independently() {
        let store = Arc::new(InMemoryStore::new());
        let reports = loader(store.clone())
            .load_seasons(&[2017, 2013, 2018], SeasonType::Regular)
            .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].year, 2017);
        assert!(matches!(reports[0].outcome, SeasonOutcome::Complete { .. }));
        assert!(reports[1].is_failed());
        assert!(matches!(reports[2].outcome, SeasonOutcome::Complete { .. }));

        // Teams are shared, bye weeks are per season
        assert_eq!(store.team_count().await, 4);
        assert_eq!(store.bye_week_count().await, 8);
    }

    #[tokio::test]
    async fn test_reload_clears_averages_of_a_final_week_bye() {
        // CAR and DAL rest in week 2 and play again in week 3
        let first = vec![
            game(1, "PHI", "ATL", [7, 0, 0, 0], [0, 0, 0, 0]),
            game(1, "CAR", "DAL", [7, 0, 0, 0], [0, 7, 0, 0]),
            game(2, "ATL", "PHI", [7, 0, 0, 0], [0, 0, 0, 0]),
            game(3, "DAL", "CAR", [0, 7, 7, 0], [3, 0, 0, 0]),
        ];
        // Corrected schedule: CAR and DAL rest in the final week instead
        let second = vec![
            game(1, "PHI", "ATL", [7, 0, 0, 0], [0, 0, 0, 0]),
            game(1, "CAR", "DAL", [7, 0, 0, 0], [0, 7, 0, 0]),
            game(2, "ATL", "PHI", [7, 0, 0, 0], [0, 0, 0, 0]),
            game(2, "DAL", "CAR", [0, 7, 7, 0], [3, 0, 0, 0]),
            game(3, "PHI", "ATL", [7, 0, 0, 0], [0, 0, 0, 0]),
        ];

        let store = Arc::new(InMemoryStore::new());
        let first_source = StaticScheduleSource::new().with_season(2018, SeasonType::Regular, first);
        let report = SeasonLoader::new(Arc::new(first_source), store.clone())
            .load_season(2018, SeasonType::Regular)
            .await;
        assert!(matches!(report.outcome, SeasonOutcome::Complete { averages: 2, .. }));

        let total = store
            .find_post_bye_averages("CAR", 2018, SeasonType::Regular, Period::TotalAvg)
            .await
            .unwrap();
        assert_eq!(total, vec![PeriodAverage { period: Period::TotalAvg, value: Some(3.0) }]);

        let second_source = StaticScheduleSource::new().with_season(2018, SeasonType::Regular, second);
        let report = SeasonLoader::new(Arc::new(second_source), store.clone())
            .load_season(2018, SeasonType::Regular)
            .await;
        assert_eq!(report.outcome, SeasonOutcome::Complete { byes: 2, averages: 0 });

        let rows = store.find_bye_weeks("CAR", 2018, SeasonType::Regular).await.unwrap();
        assert_eq!(rows, vec![ByeWeekRow { week: 3 }]);
        for team in ["CAR", "DAL"] {
            let total = store
                .find_post_bye_averages(team, 2018, SeasonType::Regular, Period::TotalAvg)
                .await
                .unwrap();
            assert!(total.is_empty(), "{} kept stale averages", team);
        }
        assert_eq!(store.averages_count().await, 0);
    }

    /// Store that refuses to create one team
    struct RejectingStore {
        inner: InMemoryStore,
        rejected_team: &'static str,
    }

    #[async_trait::async_trait]
    impl StatsStore for RejectingStore {
        async fn upsert_season(
            &self,
            year: i32,
            season_type: SeasonType,
        ) -> persistence::Result<SeasonIds> {
            self.inner.upsert_season(year, season_type).await
        }

        async fn upsert_team(&self, name: &str) -> persistence::Result<i64> {
            if name == self.rejected_team {
                return Err(StoreError::invalid_value(format!("team {}", name)));
            }
            self.inner.upsert_team(name).await
        }

        async fn upsert_bye_week(
            &self,
            week: i32,
            team_id: i64,
            season: SeasonIds,
        ) -> persistence::Result<i64> {
            self.inner.upsert_bye_week(week, team_id, season).await
        }

        async fn upsert_post_bye_averages(
            &self,
            bye_week_id: i64,
            averages: &PostByeAverages,
        ) -> persistence::Result<()> {
            self.inner.upsert_post_bye_averages(bye_week_id, averages).await
        }

        async fn delete_post_bye_averages(&self, bye_week_id: i64) -> persistence::Result<bool> {
            self.inner.delete_post_bye_averages(bye_week_id).await
        }

        async fn find_bye_week_id(
            &self,
            team: &str,
            season: SeasonIds,
        ) -> persistence::Result<Option<i64>> {
            self.inner.find_bye_week_id(team, season).await
        }

        async fn find_bye_weeks(
            &self,
            team: &str,
            year: i32,
            season_type: SeasonType,
        ) -> persistence::Result<Vec<ByeWeekRow>> {
            self.inner.find_bye_weeks(team, year, season_type).await
        }

        async fn find_post_bye_averages(
            &self,
            team: &str,
            year: i32,
            season_type: SeasonType,
            period: Period,
        ) -> persistence::Result<Vec<PeriodAverage>> {
            self.inner.find_post_bye_averages(team, year, season_type, period).await
        }
    }

    #[tokio::test]
    async fn test_row_failures_make_a_partial_outcome() {
        let store = Arc::new(RejectingStore { inner: InMemoryStore::new(), rejected_team: "DAL" });
        let report = loader(store.clone()).load_season(2018, SeasonType::Regular).await;

        match report.outcome {
            SeasonOutcome::Partial { byes, averages, failures } => {
                assert_eq!(byes, 3);
                assert_eq!(averages, 3);
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().all(|f| f.team == "DAL"));
                assert_eq!(failures[0].stage, LoadStage::Team);
                assert_eq!(failures[1].stage, LoadStage::Averages);
            }
            other => panic!("expected partial outcome, got {:?}", other),
        }
    }
}
