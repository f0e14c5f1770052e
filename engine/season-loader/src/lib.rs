//! Season loader
//!
//! Runs the fetch, aggregate and persist pipeline for one or more seasons and
//! reports how each one went.

pub mod config;
pub mod loader;
pub mod outcome;

pub use config::{LoaderConfig, SeedConfig};
pub use loader::SeasonLoader;
pub use outcome::{LoadStage, RowFailure, SeasonOutcome, SeasonReport};
