//! Persistence gateway for bye weeks and post-bye averages
//!
//! The [`StatsStore`] trait is the only thing the loader and the query API
//! see. [`PgStore`] backs it with PostgreSQL; [`InMemoryStore`] has the same
//! semantics without a database.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use config::DatabaseConfig;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{ByeWeekRow, PeriodAverage, SeasonIds, StatsStore};
