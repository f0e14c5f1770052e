//! Read API over stored bye weeks and post-bye averages

pub mod config;
pub mod error;
pub mod rest_api;

pub use config::{ApiConfig, ServerConfig};
pub use error::{handle_rejection, ApiError, ErrorDetail, ErrorResponse};
pub use rest_api::create_routes;
