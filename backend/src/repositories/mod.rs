//! PostgreSQL repositories
//!
//! One repository per table, each borrowing a connection for the duration of
//! a call. Reads run on a pooled connection; workflows that write go through a
//! [`UnitOfWork`] so every repository shares the same transaction.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::AppResult;

pub mod category;
pub mod item;
pub mod order;
pub mod order_item;

pub use category::CategoryRepository;
pub use item::ItemRepository;
pub use order::OrderRepository;
pub use order_item::OrderItemRepository;

/// Transaction scoped context handing out repositories.
///
/// Dropping it without calling [`UnitOfWork::commit`] rolls the transaction back.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    pub async fn begin(db: &PgPool) -> AppResult<Self> {
        let tx = db.begin().await?;
        Ok(Self { tx })
    }

    pub fn categories(&mut self) -> CategoryRepository<'_> {
        CategoryRepository::new(&mut *self.tx)
    }

    pub fn items(&mut self) -> ItemRepository<'_> {
        ItemRepository::new(&mut *self.tx)
    }

    pub fn orders(&mut self) -> OrderRepository<'_> {
        OrderRepository::new(&mut *self.tx)
    }

    pub fn order_items(&mut self) -> OrderItemRepository<'_> {
        OrderItemRepository::new(&mut *self.tx)
    }

    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
