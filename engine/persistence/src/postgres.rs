//! PostgreSQL-backed store

use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};
use crate::store::{ByeWeekRow, PeriodAverage, SeasonIds, StatsStore};
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use bye_weeks::{Period, PostByeAverages, SeasonType};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

/// Store on a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using the given configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!("Connected to database (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or update the schema
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// NUMERIC(6,2) value for an average; NaN and infinities are refused
fn to_decimal(column: &str, value: f64) -> Result<BigDecimal> {
    BigDecimal::from_f64(value)
        .map(|decimal| decimal.round(2))
        .ok_or_else(|| StoreError::invalid_value(format!("{} = {}", column, value)))
}

#[async_trait::async_trait]
impl StatsStore for PgStore {
    async fn upsert_season(&self, year: i32, season_type: SeasonType) -> Result<SeasonIds> {
        let mut tx = self.pool.begin().await?;

        let season_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO seasons (season_year) VALUES ($1)
            ON CONFLICT (season_year) DO UPDATE SET season_year = EXCLUDED.season_year
            RETURNING id
            "#,
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        let season_type_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO season_types (type) VALUES ($1)
            ON CONFLICT (type) DO UPDATE SET type = EXCLUDED.type
            RETURNING id
            "#,
        )
        .bind(season_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO full_years (year_id, season_type_id) VALUES ($1, $2)
            ON CONFLICT (year_id, season_type_id) DO NOTHING
            "#,
        )
        .bind(season_id)
        .bind(season_type_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Season {} {} -> ({}, {})", year, season_type, season_id, season_type_id);
        Ok(SeasonIds { season_id, season_type_id })
    }

    async fn upsert_team(&self, name: &str) -> Result<i64> {
        let team_id = sqlx::query_scalar(
            r#"
            INSERT INTO teams (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(team_id)
    }

    async fn upsert_bye_week(&self, week: i32, team_id: i64, season: SeasonIds) -> Result<i64> {
        let bye_week_id = sqlx::query_scalar(
            r#"
            INSERT INTO bye_weeks (week, team_id, season_id, season_type_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (team_id, season_id, season_type_id)
            DO UPDATE SET week = EXCLUDED.week
            RETURNING id
            "#,
        )
        .bind(week)
        .bind(team_id)
        .bind(season.season_id)
        .bind(season.season_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(bye_week_id)
    }

    async fn upsert_post_bye_averages(
        &self,
        bye_week_id: i64,
        averages: &PostByeAverages,
    ) -> Result<()> {
        let overtime = averages
            .overtime
            .map(|value| to_decimal("overtime", value))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO points_after_bye
                (bye_week_id, total_avg, first_quarter, second_quarter, third_quarter, fourth_quarter, overtime)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (bye_week_id) DO UPDATE SET
                total_avg = EXCLUDED.total_avg,
                first_quarter = EXCLUDED.first_quarter,
                second_quarter = EXCLUDED.second_quarter,
                third_quarter = EXCLUDED.third_quarter,
                fourth_quarter = EXCLUDED.fourth_quarter,
                overtime = EXCLUDED.overtime
            "#,
        )
        .bind(bye_week_id)
        .bind(to_decimal("total_avg", averages.total_avg)?)
        .bind(to_decimal("first_quarter", averages.first_quarter)?)
        .bind(to_decimal("second_quarter", averages.second_quarter)?)
        .bind(to_decimal("third_quarter", averages.third_quarter)?)
        .bind(to_decimal("fourth_quarter", averages.fourth_quarter)?)
        .bind(overtime)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_post_bye_averages(&self, bye_week_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM points_after_bye WHERE bye_week_id = $1")
            .bind(bye_week_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_bye_week_id(&self, team: &str, season: SeasonIds) -> Result<Option<i64>> {
        let bye_week_id = sqlx::query_scalar(
            r#"
            SELECT bye_weeks.id FROM bye_weeks
            JOIN teams ON teams.id = bye_weeks.team_id
            WHERE teams.name = $1
              AND bye_weeks.season_id = $2
              AND bye_weeks.season_type_id = $3
            "#,
        )
        .bind(team)
        .bind(season.season_id)
        .bind(season.season_type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bye_week_id)
    }

    async fn find_bye_weeks(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
    ) -> Result<Vec<ByeWeekRow>> {
        let rows = sqlx::query_as::<_, ByeWeekRow>(
            r#"
            SELECT bye_weeks.week FROM bye_weeks
            JOIN teams ON teams.id = bye_weeks.team_id
            JOIN seasons ON seasons.id = bye_weeks.season_id
            JOIN full_years
              ON full_years.year_id = seasons.id
             AND full_years.season_type_id = bye_weeks.season_type_id
            JOIN season_types ON season_types.id = full_years.season_type_id
            WHERE teams.name = $1
              AND season_types.type = $2
              AND seasons.season_year = $3
            ORDER BY bye_weeks.week
            "#,
        )
        .bind(team)
        .bind(season_type.as_str())
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_post_bye_averages(
        &self,
        team: &str,
        year: i32,
        season_type: SeasonType,
        period: Period,
    ) -> Result<Vec<PeriodAverage>> {
        // The column comes from the closed Period enum, never from the request
        let sql = format!(
            r#"
            SELECT points_after_bye.{} FROM points_after_bye
            JOIN bye_weeks ON bye_weeks.id = points_after_bye.bye_week_id
            JOIN teams ON teams.id = bye_weeks.team_id
            JOIN seasons ON seasons.id = bye_weeks.season_id
            JOIN season_types ON season_types.id = bye_weeks.season_type_id
            WHERE seasons.season_year = $1
              AND teams.name = $2
              AND season_types.type = $3
            "#,
            period.column()
        );

        let values: Vec<Option<BigDecimal>> = sqlx::query_scalar(&sql)
            .bind(year)
            .bind(team)
            .bind(season_type.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(values
            .into_iter()
            .map(|value| PeriodAverage { period, value: value.and_then(|d| d.to_f64()) })
            .collect())
    }
}
