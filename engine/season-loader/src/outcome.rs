use bye_weeks::SeasonType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

/// Pipeline step a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStage {
    Fetch,
    Season,
    Team,
    ByeWeek,
    Averages,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Fetch => "fetch",
            LoadStage::Season => "season",
            LoadStage::Team => "team",
            LoadStage::ByeWeek => "bye_week",
            LoadStage::Averages => "averages",
        };
        f.write_str(name)
    }
}

/// A single row that could not be written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub team: String,
    pub stage: LoadStage,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SeasonOutcome {
    /// Every bye week and average was written
    Complete { byes: usize, averages: usize },

    /// Some rows were written, the listed ones were not
    Partial { byes: usize, averages: usize, failures: Vec<RowFailure> },

    /// Nothing was written for the season
    Failed { stage: LoadStage, error: String },
}

/// Outcome of one season load
#[derive(Debug, Clone, Serialize)]
pub struct SeasonReport {
    pub year: i32,
    pub season_type: SeasonType,
    pub outcome: SeasonOutcome,
    pub finished_at: DateTime<Utc>,
}

impl SeasonReport {
    pub fn new(year: i32, season_type: SeasonType, outcome: SeasonOutcome) -> Self {
        Self { year, season_type, outcome, finished_at: Utc::now() }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SeasonOutcome::Failed { .. })
    }

    pub fn log(&self) {
        match &self.outcome {
            SeasonOutcome::Complete { byes, averages } => info!(
                "{} {} loaded: {} bye weeks, {} post-bye averages",
                self.year, self.season_type, byes, averages
            ),
            SeasonOutcome::Partial { byes, averages, failures } => {
                warn!(
                    "{} {} partially loaded: {} bye weeks, {} post-bye averages, {} failures",
                    self.year,
                    self.season_type,
                    byes,
                    averages,
                    failures.len()
                );
                for failure in failures {
                    warn!("  {} {}: {}", failure.team, failure.stage, failure.error);
                }
            }
            SeasonOutcome::Failed { stage, error } => {
                error!("{} {} failed at {}: {}", self.year, self.season_type, stage, error)
            }
        }
    }
}
