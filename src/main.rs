use std::sync::Arc;

use anyhow::{Context, Result};
use tripcreator::{TripCreatorConfig, TripPlanner, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripCreatorConfig::load().context("Failed to load configuration")?;
    let _telemetry = logging::init(&config.logging)?;

    tracing::info!("TripCreator {} starting", tripcreator::VERSION);
    if let Some(path) = TripCreatorConfig::get_config_path() {
        tracing::debug!("Default config location: {}", path.display());
    }

    let planner = TripPlanner::from_config(&config).context("Failed to set up API clients")?;
    web::run(&config.server, Arc::new(planner)).await
}
