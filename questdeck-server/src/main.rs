// File: questdeck-server/src/main.rs

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use questdeck_core::repositories::postgres::{
    PostgresCardRepository, PostgresPrizeRepository, PostgresUserRepository,
};
use questdeck_core::services::{CardService, UserService};
use questdeck_core::tasks::rotation::{spawn_rotation_task, RotationConfig, RotationScheduler};
use questdeck_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "questdeck")]
#[command(author, version, about = "QuestDeck - gamified card reward service")]
struct Args {
    /// Postgres connection URL. `DATABASE_URL` from the environment (or a
    /// `.env` file) takes precedence.
    #[arg(long, default_value = "postgres://questdeck@localhost:5432/questdeck")]
    db_url: String,

    /// Seconds between rotation ticks.
    #[arg(long, default_value_t = 20)]
    tick_interval_secs: u64,

    /// Daily cards dealt to each user per rollover.
    #[arg(long, default_value_t = 3)]
    daily_cards: usize,

    /// Require pairwise-distinct goal tags within a daily hand.
    #[arg(long, default_value_t = false)]
    distinct_goals: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("questdeck=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "QuestDeck starting. tick={}s, daily_cards={}, distinct_goals={}",
        args.tick_interval_secs, args.daily_cards, args.distinct_goals
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
    }

    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| args.db_url.clone());
    let db = Database::new(&db_url).await?;
    db.migrate().await?;

    let cards = Arc::new(PostgresCardRepository::new(db.pool().clone()));
    let users = Arc::new(PostgresUserRepository::new(db.pool().clone()));
    let prizes = Arc::new(PostgresPrizeRepository::new(db.pool().clone()));

    // The request-serving layer plugs into these two services; the daemon
    // itself only uses them for the startup report.
    let card_service = CardService::new(cards.clone(), prizes.clone());
    let user_service = UserService::new(users.clone(), prizes.clone());
    info!(
        "store ready: {} templates, {} users",
        card_service.list_templates().await?.len(),
        user_service.list_all().await?.len()
    );

    let config = RotationConfig {
        tick_interval: Duration::from_secs(args.tick_interval_secs),
        retry_interval: Duration::from_secs(args.tick_interval_secs),
        daily_hand_size: args.daily_cards,
        distinct_goals: args.distinct_goals,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = RotationScheduler::new(cards, users, config);
    let rotation_handle = spawn_rotation_task(scheduler, shutdown_rx);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {:?}", e);
    }
    info!("Ctrl-C detected; shutting down rotation scheduler...");
    let _ = shutdown_tx.send(true);
    let _ = rotation_handle.await;

    Ok(())
}
