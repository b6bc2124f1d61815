use crate::AppState;
use axum::{extract::State, http::StatusCode};

pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness: the key-value store must answer.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    match state.store.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
