use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentManager, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::category::{CategoryCreate, CategoryResponse, CategoryUpdate};
use crate::services::visibility::CategoryScope;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:category_id", patch(update_category).delete(delete_category))
}

/// Managers see every category; teachers and students only their assigned
/// ones. The scoped list also feeds the exam-creation form.
async fn list_categories(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let scope = CategoryScope::for_user(state.db(), &user)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;

    let categories = repositories::categories::list_in_scope(state.db(), &scope)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from_db).collect()))
}

async fn create_category(
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let category =
        repositories::categories::create(state.db(), &payload.name, payload.description.as_deref())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from_db(category))))
}

async fn update_category(
    Path(category_id): Path<i64>,
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::categories::update(
        state.db(),
        category_id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update category"))?;

    let Some(category) = updated else {
        return Err(ApiError::NotFound("Category not found".to_string()));
    };

    Ok(Json(CategoryResponse::from_db(category)))
}

async fn delete_category(
    Path(category_id): Path<i64>,
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::categories::delete_by_id(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete category"))?;

    if !deleted {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
