//! HTTP middleware: CORS, security headers and the store availability gate.
//!
//! ```ignore
//! use axum_helpers::http::{ReadinessGate, require_ready, security_headers};
//!
//! let gate = ReadinessGate::new(move || handle.is_ready());
//! let products = products_router
//!     .layer(axum::middleware::from_fn_with_state(gate, require_ready));
//! ```

pub mod availability;
pub mod cors;
pub mod security;

pub use availability::{ReadinessGate, require_ready};
pub use cors::{cors_layer_from_env, cors_layer_from_origins, create_permissive_cors_layer};
pub use security::security_headers;
