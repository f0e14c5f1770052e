//! REST routes for bye weeks and post-bye scoring averages

use crate::error::{handle_rejection, ApiError};
use bye_weeks::{Period, SeasonType};
use persistence::StatsStore;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use warp::Filter;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Bye weeks of a team in a regular season
pub async fn get_bye_weeks(
    team: String,
    year: i32,
    store: Arc<dyn StatsStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let rows = store
        .find_bye_weeks(&team, year, SeasonType::Regular)
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    if rows.is_empty() {
        return Err(warp::reject::custom(ApiError::not_found(&team, year, "byeweek")));
    }

    tracing::debug!("Bye weeks for {} {}: {:?}", team, year, rows);
    Ok(warp::reply::json(&rows))
}

/// Post-bye average of one period, keyed by its column name
pub async fn get_post_bye_averages(
    team: String,
    year: i32,
    period: Option<String>,
    store: Arc<dyn StatsStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let period = match period {
        Some(raw) => raw
            .parse::<Period>()
            .map_err(|e| warp::reject::custom(ApiError::from(e)))?,
        None => Period::default(),
    };

    let averages = store
        .find_post_bye_averages(&team, year, SeasonType::Regular, period)
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    if averages.is_empty() {
        return Err(warp::reject::custom(ApiError::not_found(&team, year, period.column())));
    }

    let body: Vec<Map<String, Value>> = averages
        .into_iter()
        .map(|average| {
            let mut row = Map::new();
            row.insert(average.period.column().to_string(), serde_json::json!(average.value));
            row
        })
        .collect();

    Ok(warp::reply::json(&body))
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Create all API routes
pub fn create_routes(
    store: Arc<dyn StatsStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());

    // Bye week endpoint
    let bye_week = warp::path!("byeweek" / String / i32)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_bye_weeks);

    // Post-bye averages, total by default
    let post_bye_averages = warp::path!("postbyeaverages" / String / i32)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(|team: String, year: i32, store: Arc<dyn StatsStore>| async move {
            get_post_bye_averages(team, year, None, store).await
        });

    // Post-bye averages for a named period
    let post_bye_period = warp::path!("postbyeaverages" / String / i32 / String)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(
            |team: String, year: i32, period: String, store: Arc<dyn StatsStore>| async move {
                get_post_bye_averages(team, year, Some(period), store).await
            },
        );

    let health_check = warp::path("health").and(warp::path::end()).and(warp::get()).and_then(health);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "OPTIONS"]);

    bye_week
        .or(post_bye_averages)
        .or(post_bye_period)
        .or(health_check)
        .recover(handle_rejection)
        .with(cors)
}
