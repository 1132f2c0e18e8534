//! Item repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::workflow::{StockChange, StockItem};
use shared::{CreateItemInput, Item, ItemWithCategory, Pagination, UpdateItemInput};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::AppResult;

const ITEM_WITH_CATEGORY_SELECT: &str = r#"
    SELECT i.id, i.category_id, i.name, i.price, i.stock, i.created_at, i.updated_at,
           c.name AS category_name
    FROM items i
    JOIN categories c ON c.id = i.category_id
"#;

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemWithCategoryRow {
    #[sqlx(flatten)]
    item: ItemRow,
    category_name: String,
}

impl From<ItemWithCategoryRow> for ItemWithCategory {
    fn from(row: ItemWithCategoryRow) -> Self {
        ItemWithCategory {
            item: row.item.into(),
            category_name: row.category_name,
        }
    }
}

#[derive(Debug, FromRow)]
struct StockRow {
    id: Uuid,
    name: String,
    price: Decimal,
    stock: i32,
}

pub struct ItemRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ItemRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_all_with_category(&mut self) -> AppResult<Vec<ItemWithCategory>> {
        let sql = format!("{} ORDER BY i.name, i.id", ITEM_WITH_CATEGORY_SELECT);
        let rows = sqlx::query_as::<_, ItemWithCategoryRow>(&sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_page(&mut self, pagination: &Pagination) -> AppResult<Vec<ItemWithCategory>> {
        let sql = format!(
            "{} ORDER BY i.name, i.id LIMIT $1 OFFSET $2",
            ITEM_WITH_CATEGORY_SELECT
        );
        let rows = sqlx::query_as::<_, ItemWithCategoryRow>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count(&mut self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn total_stock(&mut self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(stock), 0)::BIGINT FROM items")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }

    pub async fn find_with_category(&mut self, id: Uuid) -> AppResult<Option<ItemWithCategory>> {
        let sql = format!("{} WHERE i.id = $1", ITEM_WITH_CATEGORY_SELECT);
        let row = sqlx::query_as::<_, ItemWithCategoryRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn find_by_category(&mut self, category_id: Uuid) -> AppResult<Vec<ItemWithCategory>> {
        let sql = format!(
            "{} WHERE i.category_id = $1 ORDER BY i.name, i.id",
            ITEM_WITH_CATEGORY_SELECT
        );
        let rows = sqlx::query_as::<_, ItemWithCategoryRow>(&sql)
            .bind(category_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Items holding the most stock
    pub async fn top_by_stock(&mut self, limit: i64) -> AppResult<Vec<ItemWithCategory>> {
        let sql = format!(
            "{} ORDER BY i.stock DESC, i.name LIMIT $1",
            ITEM_WITH_CATEGORY_SELECT
        );
        let rows = sqlx::query_as::<_, ItemWithCategoryRow>(&sql)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, category_id, name, price, stock, created_at, updated_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn insert(&mut self, input: &CreateItemInput) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (id, category_id, name, price, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, category_id, name, price, stock, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(row.into())
    }

    pub async fn update(&mut self, id: Uuid, input: &UpdateItemInput) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET category_id = $2, name = $3, price = $4, stock = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, category_id, name, price, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.stock)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any order line points at the item
    pub async fn is_referenced(&mut self, id: Uuid) -> AppResult<bool> {
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE item_id = $1)")
                .bind(id)
                .fetch_one(&mut *self.conn)
                .await?;
        Ok(referenced)
    }

    /// Lock the given items for the rest of the transaction.
    ///
    /// Rows are locked in id order so concurrent workflows cannot deadlock.
    /// Unknown ids are simply absent from the result.
    pub async fn lock_stock(&mut self, ids: &[Uuid]) -> AppResult<Vec<StockItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT id, name, price, stock
            FROM items
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StockItem {
                id: row.id,
                name: row.name,
                price: row.price,
                stock: row.stock,
            })
            .collect())
    }

    /// Write the final stock levels computed by an order plan
    pub async fn set_stock(&mut self, changes: &[StockChange]) -> AppResult<()> {
        for change in changes {
            sqlx::query("UPDATE items SET stock = $2, updated_at = NOW() WHERE id = $1")
                .bind(change.item_id)
                .bind(change.stock)
                .execute(&mut *self.conn)
                .await?;
        }
        Ok(())
    }
}
