use std::sync::Arc;

use clap::Parser;
use hari_penting::{Config, Pipeline, SqliteStore};
use hari_penting_server::{SharedStore, router, spawn_scheduler};

#[derive(Parser)]
#[command(name = "hari-penting-server")]
#[command(about = "Daily observance scraper with a JSON API over the store", long_about = None)]
struct Cli {
    #[arg(long, help = "Run one scrape cycle at startup, alongside serving")]
    run_now: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();

    let config = Config::from_env()?;
    let store = Arc::new(SqliteStore::open(&config.db_path)?);
    let pipeline = Pipeline::from_config(&config, store.clone())?;

    let scheduler = spawn_scheduler(pipeline, config.daily_at, cli.run_now);

    let shared: SharedStore = store;
    let tcp_listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    log::info!("Serving observances on address: {}", config.bind_address);

    let _ = axum::serve(tcp_listener, router(shared))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await;

    scheduler.abort();
    log::info!("Shut down");

    Ok(())
}
