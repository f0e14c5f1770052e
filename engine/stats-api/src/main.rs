//! HTTP server for bye-week statistics

use persistence::PgStore;
use stats_api::{create_routes, ApiConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting stats API server...");

    let config = ApiConfig::from_env()?;
    let addr = config.socket_addr()?;

    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;
    info!("Connected to database");

    let routes = create_routes(Arc::new(store));

    info!("Listening on {}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
