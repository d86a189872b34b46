use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::MongoHandle;
use domain_products::{ImageStorage, MongoProductRepository};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors get a report
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(database = %config.mongo.database(), "Connecting to MongoDB");
    let mongo = MongoHandle::connect_with_retry(&config.mongo, None)
        .await
        .map_err(|e| eyre::eyre!("MongoDB connection failed: {}", e))?;

    MongoProductRepository::new(mongo.database())
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create product indexes: {}", e))?;

    let images = ImageStorage::new(&config.upload_dir);
    images.ensure_dir().await?;

    let state = AppState {
        config,
        mongo,
        images,
    };

    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /health: liveness with app name/version
    // - /ready: MongoDB ping
    // - /uploads: stored product images
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .merge(api::uploads_router(&state));

    info!("Starting inventory API with graceful shutdown (30s timeout)");

    let AppState { config, mongo, .. } = state;

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing MongoDB connections");
        mongo.shutdown().await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
