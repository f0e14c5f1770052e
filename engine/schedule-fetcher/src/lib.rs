//! Schedule Fetcher
//!
//! Pulls one season's game list (with per-quarter scores) from the NGS
//! schedule API and hands it back sorted by week.

pub mod config;
pub mod fetcher;
pub mod source;

pub use config::{FetcherConfig, ScheduleApiConfig};
pub use fetcher::NgsScheduleClient;
pub use source::{ScheduleSource, StaticScheduleSource};
