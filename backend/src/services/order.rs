//! Order workflow service
//!
//! Every mutating workflow runs inside one [`UnitOfWork`]: the order row and
//! the touched item rows are locked, an [`OrderPlan`] is computed against the
//! locked stock levels, and only then are the planned writes applied. Any
//! failure drops the unit of work and rolls the whole workflow back.

use std::collections::HashMap;

use chrono::Utc;
use shared::workflow::{self, OrderPlan, StockLedger};
use shared::{
    CreateOrderInput, Order, OrderDetail, OrderItem, OrderLine, OrderStatus, PaginatedResponse,
    Pagination, UpdateOrderInput, UpdateOrderStatusInput,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repositories::{OrderItemRepository, OrderRepository, UnitOfWork};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Attach lines (with item names) to each order, fetching all lines in one query
async fn hydrate(
    mut lines_repo: OrderItemRepository<'_>,
    orders: Vec<Order>,
) -> AppResult<Vec<OrderDetail>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines_repo.lines_for_orders(&ids).await? {
        lines_by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderDetail {
            order_items: lines_by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

async fn hydrate_one(lines_repo: OrderItemRepository<'_>, order: Order) -> AppResult<OrderDetail> {
    hydrate(lines_repo, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Order vanished while loading its lines".into()))
}

/// Lines of a locked order together with the locked stock of their items
async fn lock_lines(
    uow: &mut UnitOfWork,
    order_id: Uuid,
) -> AppResult<(Vec<OrderItem>, StockLedger)> {
    let existing = uow.order_items().list_by_order(order_id).await?;
    let ids = workflow::item_ids(existing.iter().map(|line| line.item_id));
    let ledger = StockLedger::new(uow.items().lock_stock(&ids).await?);
    Ok((existing, ledger))
}

fn not_cancellable(id: Uuid) -> AppError {
    AppError::NotFound(format!("Order with ID {} not found or already cancelled", id))
}

/// Write a computed plan for an existing order
async fn apply_plan(uow: &mut UnitOfWork, order_id: Uuid, plan: &OrderPlan) -> AppResult<Order> {
    uow.order_items().delete(&plan.deletes).await?;
    for line in &plan.updates {
        uow.order_items().update(line).await?;
    }
    for line in &plan.inserts {
        uow.order_items().insert(order_id, line).await?;
    }
    uow.items().set_stock(&plan.stock).await?;
    uow.orders()
        .update_status_total(order_id, plan.status, plan.total_amount)
        .await
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place a new PENDING order, taking the ordered quantities out of stock
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<OrderDetail> {
        if input.order_items.is_empty() {
            return Err(AppError::ValidationError(
                "Order must have at least one item".to_string(),
            ));
        }

        let mut uow = UnitOfWork::begin(&self.db).await?;

        let ids = workflow::item_ids(input.order_items.iter().map(|line| line.item_id));
        let mut ledger = StockLedger::new(uow.items().lock_stock(&ids).await?);
        let plan = workflow::plan_creation(&input.order_items, &mut ledger)?;

        let order_date = Utc::now();
        let order_number = uow.orders().next_order_number(order_date).await?;
        let order = uow
            .orders()
            .insert(&order_number, order_date, plan.status, plan.total_amount)
            .await?;

        for line in &plan.inserts {
            uow.order_items().insert(order.id, line).await?;
        }
        uow.items().set_stock(&plan.stock).await?;

        let detail = hydrate_one(uow.order_items(), order).await?;
        uow.commit().await?;

        tracing::info!(
            "Created order {} with {} line(s), total {}",
            detail.order.order_number,
            detail.order_items.len(),
            detail.order.total_amount
        );
        Ok(detail)
    }

    /// Move an order to another status; cancelling restores its stock
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdateOrderStatusInput,
    ) -> AppResult<OrderDetail> {
        let mut uow = UnitOfWork::begin(&self.db).await?;

        let order = uow
            .orders()
            .find_for_update(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;
        let (existing, mut ledger) = lock_lines(&mut uow, id).await?;
        let plan = workflow::plan_status_change(order.status, input.status, &existing, &mut ledger)?;

        let updated = apply_plan(&mut uow, id, &plan).await?;
        let detail = hydrate_one(uow.order_items(), updated).await?;
        uow.commit().await?;

        tracing::info!(
            "Order {} status {} -> {}",
            detail.order.order_number,
            order.status,
            detail.order.status
        );
        Ok(detail)
    }

    /// Cancel an order, putting every line back into stock.
    ///
    /// A missing order and an order that is already cancelled are both
    /// reported as not found.
    pub async fn cancel_order(&self, id: Uuid) -> AppResult<OrderDetail> {
        let mut uow = UnitOfWork::begin(&self.db).await?;

        let order = uow
            .orders()
            .find_for_update(id)
            .await?
            .filter(|order| !order.status.is_cancelled())
            .ok_or_else(|| not_cancellable(id))?;
        let (existing, mut ledger) = lock_lines(&mut uow, id).await?;
        let plan = workflow::plan_cancellation(order.status, &existing, &mut ledger)?;

        let updated = apply_plan(&mut uow, id, &plan).await?;
        let detail = hydrate_one(uow.order_items(), updated).await?;
        uow.commit().await?;

        tracing::info!(
            "Cancelled order {}, restocked {} line(s)",
            detail.order.order_number,
            plan.deletes.len()
        );
        Ok(detail)
    }

    /// Replace an order's status and lines, settling stock by line differences
    pub async fn update_order(&self, id: Uuid, input: UpdateOrderInput) -> AppResult<OrderDetail> {
        let mut uow = UnitOfWork::begin(&self.db).await?;

        let order = uow
            .orders()
            .find_for_update(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;
        let existing = uow.order_items().list_by_order(id).await?;

        let ids = workflow::item_ids(
            existing
                .iter()
                .map(|line| line.item_id)
                .chain(input.order_items.iter().map(|line| line.item_id)),
        );
        let mut ledger = StockLedger::new(uow.items().lock_stock(&ids).await?);
        let plan = workflow::plan_edit(
            order.status,
            input.status,
            &existing,
            &input.order_items,
            &mut ledger,
        )?;

        let updated = apply_plan(&mut uow, id, &plan).await?;
        let detail = hydrate_one(uow.order_items(), updated).await?;
        uow.commit().await?;

        tracing::info!(
            "Edited order {}: {} added, {} updated, {} removed",
            detail.order.order_number,
            plan.inserts.len(),
            plan.updates.len(),
            plan.deletes.len()
        );
        Ok(detail)
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<OrderDetail> {
        let mut conn = self.db.acquire().await?;
        let order = OrderRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;
        hydrate_one(OrderItemRepository::new(&mut *conn), order).await
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> AppResult<OrderDetail> {
        let mut conn = self.db.acquire().await?;
        let order = OrderRepository::new(&mut *conn)
            .find_by_number(order_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order with number {} not found", order_number)))?;
        hydrate_one(OrderItemRepository::new(&mut *conn), order).await
    }

    /// All orders with their lines, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<OrderDetail>> {
        let mut conn = self.db.acquire().await?;
        let orders = OrderRepository::new(&mut *conn).find_all().await?;
        hydrate(OrderItemRepository::new(&mut *conn), orders).await
    }

    pub async fn list_orders_page(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<OrderDetail>> {
        let mut conn = self.db.acquire().await?;
        let mut repo = OrderRepository::new(&mut *conn);
        let total = repo.count().await?;
        let orders = repo.find_page(&pagination).await?;
        let details = hydrate(OrderItemRepository::new(&mut *conn), orders).await?;
        Ok(PaginatedResponse::new(details, &pagination, total.max(0) as u64))
    }

    pub async fn list_orders_by_status(&self, status: OrderStatus) -> AppResult<Vec<OrderDetail>> {
        let mut conn = self.db.acquire().await?;
        let orders = OrderRepository::new(&mut *conn).find_by_status(status).await?;
        hydrate(OrderItemRepository::new(&mut *conn), orders).await
    }

    /// Delete an order and its lines. Stock is left as it is.
    pub async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.db.acquire().await?;
        if !OrderRepository::new(&mut *conn).delete(id).await? {
            return Err(AppError::not_found("Order", id));
        }

        tracing::info!("Deleted order {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_cancelling_twice_reports_not_found() {
        let id = Uuid::new_v4();
        let err = not_cancellable(id);

        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));
        assert_eq!(
            err.client_message(),
            format!("Order with ID {} not found or already cancelled", id)
        );
    }
}
