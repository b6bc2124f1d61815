use crate::AppState;
use crate::models::{CachedAuth, GatewayUser};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub module: Option<String>,
    pub feature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

pub async fn get_access(
    State(state): State<AppState>,
    user: GatewayUser,
) -> Result<Json<CachedAuth>, AppError> {
    let auth = state.permissions.access(&user.user_id).await?;
    Ok(Json(auth))
}

pub async fn clear_access(State(state): State<AppState>, user: GatewayUser) -> StatusCode {
    state.permissions.invalidate(&user.user_id).await;
    tracing::info!(user_id = %user.user_id, "Cleared cached permissions");
    StatusCode::NO_CONTENT
}

pub async fn check_access(
    State(state): State<AppState>,
    user: GatewayUser,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    if query.module.is_none() && query.feature.is_none() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Specify a module or a feature to check"
        )));
    }

    let allowed = state
        .permissions
        .check(
            &user.user_id,
            query.module.as_deref(),
            query.feature.as_deref(),
        )
        .await?;

    if !allowed {
        tracing::info!(
            user_id = %user.user_id,
            module = ?query.module,
            feature = ?query.feature,
            "Access denied"
        );
    }

    Ok(Json(CheckResponse { allowed }))
}
