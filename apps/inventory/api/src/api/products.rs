use axum::{Router, middleware};
use axum_helpers::{ReadinessGate, require_ready};
use domain_products::{MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Product routes backed by MongoDB, refused with 503 while the store is
/// unreachable.
pub fn router(state: &AppState) -> Router {
    let repository = MongoProductRepository::new(state.mongo.database());
    let service = ProductService::new(repository);

    let mongo = state.mongo.clone();
    let gate = ReadinessGate::new(move || mongo.is_ready());

    handlers::router(service, state.images.clone())
        .layer(middleware::from_fn_with_state(gate, require_ready))
}
