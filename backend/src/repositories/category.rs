//! Category repository

use chrono::{DateTime, Utc};
use shared::{Category, CategorySummary, CreateCategoryInput, Pagination, UpdateCategoryInput};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategorySummaryRow {
    id: Uuid,
    name: String,
    item_count: i64,
}

pub struct CategoryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_all(&mut self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name, id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_page(&mut self, pagination: &Pagination) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count(&mut self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn exists(&mut self, id: Uuid) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *self.conn)
                .await?;
        Ok(exists)
    }

    pub async fn insert(&mut self, input: &CreateCategoryInput) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(row.into())
    }

    pub async fn update(
        &mut self,
        id: Uuid,
        input: &UpdateCategoryInput,
    ) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a category; its items go with it. Returns false when no row matched.
    pub async fn delete(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any item of the category appears on an order line
    pub async fn has_referenced_items(&mut self, id: Uuid) -> AppResult<bool> {
        let referenced: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM order_items oi
                JOIN items i ON i.id = oi.item_id
                WHERE i.category_id = $1
            )
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(referenced)
    }

    /// Categories ranked by how many items they own
    pub async fn top_by_item_count(&mut self, limit: i64) -> AppResult<Vec<CategorySummary>> {
        let rows = sqlx::query_as::<_, CategorySummaryRow>(
            r#"
            SELECT c.id, c.name, COUNT(i.id) AS item_count
            FROM categories c
            LEFT JOIN items i ON i.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY item_count DESC, c.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategorySummary {
                id: row.id,
                name: row.name,
                item_count: row.item_count,
            })
            .collect())
    }
}
