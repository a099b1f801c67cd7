use anyhow::Result;
use shared::Config;
use tracker::{logging::init_logging, HolderTracker};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(config.tracker.json_logs);

    tracing::info!("Configuration loaded for mint {}", config.tracker.token_mint);

    let tracker = HolderTracker::new(config)?;
    match tracker.run().await {
        Ok(saved) => {
            tracing::info!("Reports written to {}", saved.holders.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Holder tracking failed: {}", e);
            Err(e.into())
        }
    }
}
