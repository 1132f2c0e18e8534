//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use shared::{Category, CreateCategoryInput, UpdateCategoryInput};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::CategoryService;
use crate::AppState;

/// List all categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Get a category by ID
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let category = service.get_category(id).await?;
    Ok(Json(category))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateCategoryInput>, AppError>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    let location = format!("/api/categories/{}", category.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<UpdateCategoryInput>, AppError>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let category = service.update_category(id, input).await?;
    Ok(Json(category))
}

/// Delete a category and its items
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CategoryService::new(state.db);
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
