use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub mod health;
pub mod products;

/// API routes without the `/api` prefix; `create_router` adds it.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// `/ready` with a live MongoDB ping.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Uploaded product images under `/uploads`.
pub fn uploads_router(state: &AppState) -> Router {
    Router::new().nest_service(
        domain_products::uploads::PUBLIC_PREFIX,
        ServeDir::new(state.images.dir()),
    )
}
