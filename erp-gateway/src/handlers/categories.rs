use crate::AppState;
use crate::models::category::{CategoryNode, FlatCategory, FlatNode};
use crate::services::category_tree;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct DescendantsResponse {
    pub id: i64,
    pub ids: Vec<i64>,
}

pub async fn build_tree(Json(categories): Json<Vec<FlatCategory>>) -> Json<Vec<CategoryNode>> {
    Json(category_tree::build_tree(&categories))
}

pub async fn flatten(Json(categories): Json<Vec<FlatCategory>>) -> Json<Vec<FlatNode>> {
    let tree = category_tree::build_tree(&categories);
    Json(category_tree::flatten_tree_owned(&tree))
}

/// Ids to filter by when a category is selected together with its children.
pub async fn descendants(
    Path(id): Path<i64>,
    Json(categories): Json<Vec<FlatCategory>>,
) -> Result<Json<DescendantsResponse>, AppError> {
    let tree = category_tree::build_tree(&categories);
    let node = category_tree::find_node(&tree, id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Category {} not found", id)))?;

    Ok(Json(DescendantsResponse {
        id,
        ids: category_tree::descendant_ids(node),
    }))
}

/// Tree of the live catalog, fetched from the backend.
pub async fn catalog_tree(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    let categories = state.backend.fetch_categories().await?;
    tracing::debug!(count = categories.len(), "Building catalog category tree");
    Ok(Json(category_tree::build_tree(&categories)))
}
