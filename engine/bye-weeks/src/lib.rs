//! Bye-week statistics core
//!
//! Walks a season's schedule in week order, works out which week each team
//! rested, and folds every post-bye game into per-team scoring totals that are
//! later turned into rounded averages. Everything in here is pure; fetching
//! and persistence live in their own crates.

pub mod aggregator;
pub mod averages;
pub mod error;
pub mod models;

pub use aggregator::{aggregate_season, home_teams, sort_by_week, SeasonAggregate};
pub use averages::{compute_averages, round2};
pub use error::{ModelError, Result};
pub use models::*;
