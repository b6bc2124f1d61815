use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use service_core::middleware::request_id_middleware;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers::{
    access::{check_access, clear_access, get_access},
    app::{health_check, ready},
    categories::{build_tree, catalog_tree, descendants, flatten},
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready))
        .route("/api/categories/tree", get(catalog_tree).post(build_tree))
        .route("/api/categories/flatten", post(flatten))
        .route("/api/categories/:id/descendants", post(descendants))
        .route("/api/me/access", get(get_access).delete(clear_access))
        .route("/api/me/access/check", get(check_access))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
