//! # Axum Helpers
//!
//! Shared HTTP plumbing for the inventory services.
//!
//! - **[`server`]**: router assembly with OpenAPI docs, health endpoints,
//!   graceful shutdown
//! - **[`http`]**: CORS, security headers, the store availability gate
//! - **[`errors`]**: [`AppError`] and the `{code, error, message, details}`
//!   response body
//! - **[`extractors`]**: [`UuidPath`]
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes).await?;
//! let app = router.merge(health_router(app_info!()));
//! create_production_app(app, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{
    ReadinessGate, cors_layer_from_env, cors_layer_from_origins, create_permissive_cors_layer,
    require_ready, security_headers,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::UuidPath;
