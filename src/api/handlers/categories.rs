//! Category endpoints.

use crate::{
    api::{
        AppState,
        error::{ApiJson, ApiPath, ApiResult},
    },
    core::category,
    entities::CategoryModel,
};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Body of POST /api/categories
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hex display color
    #[serde(default)]
    pub color: Option<String>,
}

/// Response of DELETE /api/categories/:id
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    /// Human-readable outcome
    pub message: String,
    /// The removed category
    pub category: CategoryModel,
    /// Number of valid names the category was removed from
    pub detached: u64,
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryModel>>> {
    Ok(Json(category::get_all_categories(&state.db).await?))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryModel>)> {
    let created = category::create_category(&state.db, body.name, body.color).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteCategoryResponse>> {
    let deleted = category::delete_category(&state.db, id).await?;
    Ok(Json(DeleteCategoryResponse {
        message: "Category deleted".to_string(),
        category: deleted.category,
        detached: deleted.detached,
    }))
}
