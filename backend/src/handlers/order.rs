//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use shared::{
    CreateOrderInput, OrderDetail, OrderStatus, UpdateOrderInput, UpdateOrderStatusInput,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::OrderService;
use crate::AppState;

/// List all orders, newest first
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderDetail>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Get an order by ID
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(id).await?;
    Ok(Json(order))
}

/// Get an order by its order number
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order_by_number(&order_number).await?;
    Ok(Json(order))
}

/// List orders in a given status (case-insensitive)
pub async fn list_orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let status: OrderStatus = status.parse().map_err(|_| AppError::Validation {
        field: "status".to_string(),
        message: format!("Unknown order status: {}", status),
    })?;

    let service = OrderService::new(state.db);
    let orders = service.list_orders_by_status(status).await?;
    Ok(Json(orders))
}

/// Place an order
pub async fn create_order(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateOrderInput>, AppError>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input).await?;
    let location = format!("/api/orders/{}", order.order.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(order)))
}

/// Edit an order's status and lines
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<UpdateOrderInput>, AppError>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.update_order(id, input).await?;
    Ok(Json(order))
}

/// Change an order's status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<UpdateOrderStatusInput>, AppError>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.update_status(id, input).await?;
    Ok(Json(order))
}

/// Cancel an order
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.cancel_order(id).await?;
    Ok(Json(order))
}

/// Delete an order
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = OrderService::new(state.db);
    service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
