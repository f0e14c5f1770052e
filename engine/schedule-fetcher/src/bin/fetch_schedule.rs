use anyhow::Result;
use bye_weeks::{aggregate_season, SeasonType};
use clap::Parser;
use schedule_fetcher::{FetcherConfig, NgsScheduleClient, ScheduleSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch one season and print its bye weeks without touching the database
#[derive(Parser)]
#[command(name = "fetch-schedule")]
struct Args {
    /// Season year, e.g. 2018
    year: i32,

    /// Season type: PRE, REG or POST
    #[arg(default_value = "REG")]
    season_type: SeasonType,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = FetcherConfig::from_env()?;
    let client = NgsScheduleClient::new(config.schedule_api)?;

    let games = client.fetch_season(args.year, args.season_type).await?;
    let aggregate = aggregate_season(&games);
    info!("{} games, {} bye weeks", games.len(), aggregate.byes.len());

    let averages = aggregate.averages();
    for bye in &aggregate.byes {
        match averages.get(&bye.team) {
            Some(avg) => println!(
                "{:<4} bye week {:>2}  post-bye avg {:>6.2}  (Q1 {:.2}, Q2 {:.2}, Q3 {:.2}, Q4 {:.2})",
                bye.team,
                bye.week,
                avg.total_avg,
                avg.first_quarter,
                avg.second_quarter,
                avg.third_quarter,
                avg.fourth_quarter
            ),
            None => println!("{:<4} bye week {:>2}  no post-bye games", bye.team, bye.week),
        }
    }

    Ok(())
}
