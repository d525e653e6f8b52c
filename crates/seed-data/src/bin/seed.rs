//! Seeds the navigation tables once and exits.
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed
//! ```

use seed_data::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_config = DatabaseConfig::from_env();
    let seed_config = SeedConfig::from_env();

    let pool = db_config.connect().await?;
    tracing::info!("Connected to database");

    let dataset = Dataset::load(seed_config.data_path.as_deref())?;
    let summary = Seeder::new(PgBackend::new(pool))
        .with_config(seed_config)
        .run(&dataset)
        .await?;

    tracing::info!("Seed completed!");
    for (table, kind) in summary.iter() {
        tracing::info!(
            "  {}: {} inserted, {} skipped",
            table,
            kind.inserted,
            kind.skipped()
        );
    }

    Ok(())
}
