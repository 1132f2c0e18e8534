//! Item (inventory) management service

use shared::{
    CreateItemInput, ItemWithCategory, PaginatedResponse, Pagination, UpdateItemInput,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::repositories::{ItemRepository, UnitOfWork};

/// Item service for catalog maintenance
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
}

/// Category an update has to confirm: only a changed category is looked up
fn category_to_confirm(current: Uuid, requested: Uuid) -> Option<Uuid> {
    (current != requested).then_some(requested)
}

fn require_category(category_id: Uuid, exists: bool) -> AppResult<()> {
    if exists {
        return Ok(());
    }
    Err(AppError::Validation {
        field: "category_id".to_string(),
        message: format!("Category with ID {} does not exist", category_id),
    })
}

impl ItemService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all items with their category names
    pub async fn list_items(&self) -> AppResult<Vec<ItemWithCategory>> {
        let mut conn = self.db.acquire().await?;
        ItemRepository::new(&mut *conn).find_all_with_category().await
    }

    pub async fn list_items_page(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<ItemWithCategory>> {
        let mut conn = self.db.acquire().await?;
        let mut repo = ItemRepository::new(&mut *conn);
        let total = repo.count().await?;
        let items = repo.find_page(&pagination).await?;
        Ok(PaginatedResponse::new(items, &pagination, total.max(0) as u64))
    }

    pub async fn list_items_by_category(
        &self,
        category_id: Uuid,
    ) -> AppResult<Vec<ItemWithCategory>> {
        let mut conn = self.db.acquire().await?;
        ItemRepository::new(&mut *conn)
            .find_by_category(category_id)
            .await
    }

    pub async fn get_item(&self, id: Uuid) -> AppResult<ItemWithCategory> {
        let mut conn = self.db.acquire().await?;
        ItemRepository::new(&mut *conn)
            .find_with_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("Item", id))
    }

    /// Create an item in an existing category
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<ItemWithCategory> {
        input.validate()?;

        let mut uow = UnitOfWork::begin(&self.db).await?;

        let exists = uow.categories().exists(input.category_id).await?;
        require_category(input.category_id, exists)?;

        let item = uow.items().insert(&input).await?;
        let created = uow
            .items()
            .find_with_category(item.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created item could not be read back".into()))?;
        uow.commit().await?;

        tracing::info!("Created item {} ({})", created.item.name, created.item.id);
        Ok(created)
    }

    /// Replace an item's fields; the category is checked only when it changes
    pub async fn update_item(
        &self,
        id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<ItemWithCategory> {
        input.validate()?;

        let mut uow = UnitOfWork::begin(&self.db).await?;

        let current = uow
            .items()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Item", id))?;

        if let Some(category_id) = category_to_confirm(current.category_id, input.category_id) {
            let exists = uow.categories().exists(category_id).await?;
            require_category(category_id, exists)?;
        }

        uow.items()
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Item", id))?;
        let updated = uow
            .items()
            .find_with_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("Item", id))?;
        uow.commit().await?;

        Ok(updated)
    }

    /// Delete an item that no order refers to
    pub async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        let mut uow = UnitOfWork::begin(&self.db).await?;

        if uow.items().find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Item", id));
        }

        if uow.items().is_referenced(id).await? {
            return Err(AppError::conflict(
                "item",
                "Item is referenced by existing orders",
            ));
        }

        uow.items().delete(id).await?;
        uow.commit().await?;

        tracing::info!("Deleted item {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_category_is_not_looked_up() {
        let category = Uuid::new_v4();
        assert_eq!(category_to_confirm(category, category), None);
    }

    #[test]
    fn test_reassignment_to_missing_category_fails() {
        let (current, requested) = (Uuid::new_v4(), Uuid::new_v4());
        let category_id = category_to_confirm(current, requested).unwrap();
        assert_eq!(category_id, requested);

        match require_category(category_id, false) {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "category_id");
                assert_eq!(message, format!("Category with ID {} does not exist", requested));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reassignment_to_existing_category_succeeds() {
        let (current, requested) = (Uuid::new_v4(), Uuid::new_v4());
        let category_id = category_to_confirm(current, requested).unwrap();
        assert!(require_category(category_id, true).is_ok());
    }
}
