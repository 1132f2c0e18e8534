//! Order repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{Order, OrderStatus, Pagination};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Advisory lock key guarding order number allocation
const ORDER_NUMBER_LOCK_KEY: i64 = 0x4f52_445f_4e55_4d42;

const ORDER_SELECT: &str = r#"
    SELECT id, order_number, order_date, total_amount, status, created_at
    FROM orders
"#;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e: shared::ParseOrderStatusError| AppError::Internal(e.to_string()))?;

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            order_date: row.order_date,
            total_amount: row.total_amount,
            status,
            created_at: row.created_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

/// Order counts and revenue for the dashboard
#[derive(Debug, Clone, Default, FromRow)]
pub struct OrderTotals {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub paid_orders: i64,
    pub cancelled_orders: i64,
    pub revenue: Decimal,
}

pub struct OrderRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Allocate the next order number for `order_date`.
    ///
    /// Takes a transaction scoped advisory lock first, so concurrent creations
    /// serialize here until the allocating transaction ends.
    pub async fn next_order_number(&mut self, order_date: DateTime<Utc>) -> AppResult<String> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ORDER_NUMBER_LOCK_KEY)
            .execute(&mut *self.conn)
            .await?;

        let date = order_date.date_naive();
        let prefix = shared::daily_prefix(date);

        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT order_number
            FROM orders
            WHERE order_number LIKE $1 || '%'
            ORDER BY order_number DESC
            LIMIT 1
            "#,
        )
        .bind(&prefix)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(shared::next_order_number(date, last.as_deref())?)
    }

    pub async fn insert(
        &mut self,
        order_number: &str,
        order_date: DateTime<Utc>,
        status: OrderStatus,
        total_amount: Decimal,
    ) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, order_number, order_date, total_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, order_number, order_date, total_amount, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_number)
        .bind(order_date)
        .bind(total_amount)
        .bind(status.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> AppResult<Option<Order>> {
        let sql = format!("{} WHERE id = $1", ORDER_SELECT);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Load and lock an order row for the rest of the transaction
    pub async fn find_for_update(&mut self, id: Uuid) -> AppResult<Option<Order>> {
        let sql = format!("{} WHERE id = $1 FOR UPDATE", ORDER_SELECT);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Order::try_from).transpose()
    }

    pub async fn find_by_number(&mut self, order_number: &str) -> AppResult<Option<Order>> {
        let sql = format!("{} WHERE order_number = $1", ORDER_SELECT);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_number)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// All orders, newest first
    pub async fn find_all(&mut self) -> AppResult<Vec<Order>> {
        let sql = format!("{} ORDER BY order_date DESC, order_number DESC", ORDER_SELECT);
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        into_orders(rows)
    }

    pub async fn find_page(&mut self, pagination: &Pagination) -> AppResult<Vec<Order>> {
        let sql = format!(
            "{} ORDER BY order_date DESC, order_number DESC LIMIT $1 OFFSET $2",
            ORDER_SELECT
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut *self.conn)
            .await?;

        into_orders(rows)
    }

    pub async fn find_recent(&mut self, limit: i64) -> AppResult<Vec<Order>> {
        let sql = format!(
            "{} ORDER BY order_date DESC, order_number DESC LIMIT $1",
            ORDER_SELECT
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await?;

        into_orders(rows)
    }

    pub async fn find_by_status(&mut self, status: OrderStatus) -> AppResult<Vec<Order>> {
        let sql = format!(
            "{} WHERE status = $1 ORDER BY order_date DESC, order_number DESC",
            ORDER_SELECT
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&mut *self.conn)
            .await?;

        into_orders(rows)
    }

    pub async fn count(&mut self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn totals(&mut self) -> AppResult<OrderTotals> {
        let totals = sqlx::query_as::<_, OrderTotals>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending_orders,
                COUNT(*) FILTER (WHERE status = 'PAID') AS paid_orders,
                COUNT(*) FILTER (WHERE status = 'CANCELLED') AS cancelled_orders,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'PAID'), 0) AS revenue
            FROM orders
            "#,
        )
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(totals)
    }

    pub async fn update_status_total(
        &mut self,
        id: Uuid,
        status: OrderStatus,
        total_amount: Decimal,
    ) -> AppResult<Order> {
        let sql = r#"
            UPDATE orders
            SET status = $2, total_amount = $3
            WHERE id = $1
            RETURNING id, order_number, order_date, total_amount, status, created_at
        "#;
        let row = sqlx::query_as::<_, OrderRow>(sql)
            .bind(id)
            .bind(status.as_str())
            .bind(total_amount)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;

        row.try_into()
    }

    /// Delete an order and, by cascade, its lines
    pub async fn delete(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
