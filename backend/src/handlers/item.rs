//! HTTP handlers for item endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use shared::{CreateItemInput, ItemWithCategory, UpdateItemInput};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ItemService;
use crate::AppState;

/// List all items with their category names
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<ItemWithCategory>>> {
    let service = ItemService::new(state.db);
    let items = service.list_items().await?;
    Ok(Json(items))
}

/// Get an item by ID
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ItemWithCategory>> {
    let service = ItemService::new(state.db);
    let item = service.get_item(id).await?;
    Ok(Json(item))
}

/// List the items of a category
pub async fn list_items_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Vec<ItemWithCategory>>> {
    let service = ItemService::new(state.db);
    let items = service.list_items_by_category(category_id).await?;
    Ok(Json(items))
}

/// Create an item
pub async fn create_item(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateItemInput>, AppError>,
) -> AppResult<impl IntoResponse> {
    let service = ItemService::new(state.db);
    let item = service.create_item(input).await?;
    let location = format!("/api/items/{}", item.item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)))
}

/// Update an item
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<UpdateItemInput>, AppError>,
) -> AppResult<Json<ItemWithCategory>> {
    let service = ItemService::new(state.db);
    let item = service.update_item(id, input).await?;
    Ok(Json(item))
}

/// Delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ItemService::new(state.db);
    service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
