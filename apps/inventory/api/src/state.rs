//! Shared application state.

use database::mongodb::MongoHandle;
use domain_products::ImageStorage;

/// Cloned into every router that needs it (handle clones share one client).
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// MongoDB client, database and readiness flag
    pub mongo: MongoHandle,
    pub images: ImageStorage,
}
