use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;

use crate::errors::AppError;

/// Readiness probe consulted before a request reaches the store.
///
/// Wraps any cheap, non-blocking check, typically a flag kept current by a
/// background health monitor.
#[derive(Clone)]
pub struct ReadinessGate(Arc<dyn Fn() -> bool + Send + Sync>);

impl ReadinessGate {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn always_ready() -> Self {
        Self::new(|| true)
    }

    pub fn is_ready(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Short-circuits with 503 while the gate reports not ready.
///
/// Use with `axum::middleware::from_fn_with_state(gate, require_ready)`.
pub async fn require_ready(
    State(gate): State<ReadinessGate>,
    request: Request,
    next: Next,
) -> Response {
    if !gate.is_ready() {
        return AppError::ServiceUnavailable("Database connection not available".to_string())
            .into_response();
    }

    next.run(request).await
}
