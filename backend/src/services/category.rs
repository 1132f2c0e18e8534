//! Category management service

use shared::{Category, CreateCategoryInput, PaginatedResponse, Pagination, UpdateCategoryInput};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repositories::{CategoryRepository, UnitOfWork};

/// Category service for catalog maintenance
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all categories ordered by name
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut conn = self.db.acquire().await?;
        CategoryRepository::new(&mut *conn).find_all().await
    }

    /// One page of categories
    pub async fn list_categories_page(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Category>> {
        let mut conn = self.db.acquire().await?;
        let mut repo = CategoryRepository::new(&mut *conn);
        let total = repo.count().await?;
        let categories = repo.find_page(&pagination).await?;
        Ok(PaginatedResponse::new(categories, &pagination, total.max(0) as u64))
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        let mut conn = self.db.acquire().await?;
        CategoryRepository::new(&mut *conn)
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let mut conn = self.db.acquire().await?;
        let category = CategoryRepository::new(&mut *conn).insert(&input).await?;

        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        input.validate()?;

        let mut conn = self.db.acquire().await?;
        CategoryRepository::new(&mut *conn)
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    /// Delete a category together with its items.
    ///
    /// Refused while any of its items still appears on an order.
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let mut uow = UnitOfWork::begin(&self.db).await?;

        if !uow.categories().exists(id).await? {
            return Err(AppError::not_found("Category", id));
        }

        if uow.categories().has_referenced_items(id).await? {
            return Err(AppError::conflict(
                "category",
                "Category has items that are referenced by orders",
            ));
        }

        uow.categories().delete(id).await?;
        uow.commit().await?;

        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}
