//! Error types for the bye-week core

use thiserror::Error;

/// Result type alias for parsing domain labels
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown season type: {0}")]
    UnknownSeasonType(String),

    #[error("Unknown scoring period: {0}")]
    UnknownPeriod(String),
}
