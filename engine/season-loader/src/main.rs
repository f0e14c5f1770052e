use bye_weeks::SeasonType;
use clap::Parser;
use persistence::PgStore;
use schedule_fetcher::NgsScheduleClient;
use season_loader::{LoaderConfig, SeasonLoader};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch seasons from the schedule API and store their bye-week statistics
#[derive(Parser)]
#[command(name = "seed-seasons")]
struct Args {
    /// Season years to load; defaults to SEED_YEARS or 2014-2018
    years: Vec<i32>,

    /// Season type: PRE, REG or POST; defaults to SEED_SEASON_TYPE or REG
    #[arg(long)]
    season_type: Option<SeasonType>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = LoaderConfig::from_env()?;
    if !args.years.is_empty() {
        config.seed.years = args.years;
    }
    if let Some(season_type) = args.season_type {
        config.seed.season_type = season_type;
    }

    info!("Seeding {:?} {} seasons", config.seed.years, config.seed.season_type);

    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;

    let source = NgsScheduleClient::new(config.fetcher.schedule_api.clone())?;
    let loader = SeasonLoader::new(Arc::new(source), Arc::new(store));

    let reports = loader.load_seasons(&config.seed.years, config.seed.season_type).await;
    let failed: Vec<i32> = reports.iter().filter(|r| r.is_failed()).map(|r| r.year).collect();

    if !failed.is_empty() {
        anyhow::bail!("Failed to load seasons: {:?}", failed);
    }

    info!("Seeding complete");
    Ok(())
}
