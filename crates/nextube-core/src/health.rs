use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;

/// Something a service must be able to reach before it takes traffic.
pub trait Readiness: Send + Sync {
    fn is_ready(&self) -> impl Future<Output = bool> + Send;
}

/// Handler for `GET /healthz`. Liveness only; never touches dependencies.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`. 503 until the state reports ready.
pub async fn readyz<S>(State(state): State<S>) -> StatusCode
where
    S: Readiness + Clone,
{
    if state.is_ready().await {
        StatusCode::OK
    } else {
        tracing::warn!("readiness probe failed");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
