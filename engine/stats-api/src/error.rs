//! Error types and rejection handling for the stats API

use bye_weeks::ModelError;
use persistence::StoreError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No entry for '{team}' '{year}' '{what}'")]
    NotFound { team: String, year: i32, what: String },

    #[error(transparent)]
    InvalidPeriod(#[from] ModelError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn not_found(team: &str, year: i32, what: impl Into<String>) -> Self {
        Self::NotFound { team: team.to_string(), year, what: what.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::InvalidPeriod(_) => "INVALID_PERIOD",
            ApiError::Store(_) => "DATABASE_ERROR",
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail { code: code.to_string(), message: message.into() },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Turn any rejection into a JSON error body with the matching status
pub async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, body) = if let Some(api_error) = err.find::<ApiError>() {
        if let ApiError::Store(e) = api_error {
            tracing::error!("Store failure while serving request: {}", e);
            (api_error.status(), ErrorResponse::new(api_error.code(), "Failed to read statistics"))
        } else {
            (api_error.status(), ErrorResponse::new(api_error.code(), api_error.to_string()))
        }
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", "Route not found"))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, ErrorResponse::new("METHOD_NOT_ALLOWED", "Only GET is supported"))
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new("INTERNAL_ERROR", "Internal server error"))
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
