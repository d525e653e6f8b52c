use std::env;

use navigation::run_server;
use seed_data::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let db_config = DatabaseConfig::from_env();
    let seed_config = SeedConfig::from_env();

    tracing::info!(
        "Connecting to database (ssl mode {:?})",
        db_config.ssl_mode
    );

    let pool = db_config.connect().await?;

    let dataset = Dataset::load(seed_config.data_path.as_deref())?;

    let port = env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001);

    let seeder = Seeder::new(PgBackend::new(pool)).with_config(seed_config);

    run_server(seeder, dataset, port).await
}
