//! Order line repository

use rust_decimal::Decimal;
use shared::workflow::{LineUpdate, NewLine};
use shared::{OrderItem, OrderLine};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    item_id: Uuid,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            item_id: row.item_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    item_id: Uuid,
    item_name: String,
    quantity: i32,
    price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            subtotal: row.price * Decimal::from(row.quantity),
            id: row.id,
            order_id: row.order_id,
            item_id: row.item_id,
            item_name: row.item_name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

pub struct OrderItemRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderItemRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list_by_order(&mut self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, item_id, quantity, price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lines of several orders with their item names, in one query
    pub async fn lines_for_orders(&mut self, order_ids: &[Uuid]) -> AppResult<Vec<OrderLine>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT oi.id, oi.order_id, oi.item_id, i.name AS item_name, oi.quantity, oi.price
            FROM order_items oi
            JOIN items i ON i.id = oi.item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, i.name, oi.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&mut self, order_id: Uuid, line: &NewLine) -> AppResult<OrderItem> {
        let row = sqlx::query_as::<_, OrderItemRow>(
            r#"
            INSERT INTO order_items (id, order_id, item_id, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, item_id, quantity, price
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(line.price)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(row.into())
    }

    pub async fn update(&mut self, line: &LineUpdate) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE order_items
            SET item_id = $2, quantity = $3, price = $4
            WHERE id = $1
            "#,
        )
        .bind(line.id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete(&mut self, ids: &[Uuid]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM order_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
