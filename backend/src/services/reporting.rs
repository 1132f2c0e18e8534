//! Reporting service for the back-office dashboard

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{CategorySummary, ItemWithCategory, Order};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::repositories::{CategoryRepository, ItemRepository, OrderRepository};

/// Rows shown in each dashboard list
const DASHBOARD_LIST_SIZE: i64 = 5;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Recent order with the badge the admin pages render for its status
#[derive(Debug, Serialize)]
pub struct RecentOrder {
    #[serde(flatten)]
    pub order: Order,
    pub badge_class: &'static str,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_categories: i64,
    pub total_items: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub paid_orders: i64,
    pub cancelled_orders: i64,
    /// Sum of PAID order totals
    pub revenue: Decimal,
    pub total_stock: i64,
    pub recent_orders: Vec<RecentOrder>,
    pub top_stock_items: Vec<ItemWithCategory>,
    pub top_categories: Vec<CategorySummary>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get dashboard metrics
    pub async fn get_dashboard(&self) -> AppResult<DashboardMetrics> {
        let mut conn = self.db.acquire().await?;

        let total_categories = CategoryRepository::new(&mut *conn).count().await?;
        let top_categories = CategoryRepository::new(&mut *conn)
            .top_by_item_count(DASHBOARD_LIST_SIZE)
            .await?;

        let mut items = ItemRepository::new(&mut *conn);
        let total_items = items.count().await?;
        let total_stock = items.total_stock().await?;
        let top_stock_items = items.top_by_stock(DASHBOARD_LIST_SIZE).await?;

        let mut orders = OrderRepository::new(&mut *conn);
        let totals = orders.totals().await?;
        let recent_orders = orders
            .find_recent(DASHBOARD_LIST_SIZE)
            .await?
            .into_iter()
            .map(|order| RecentOrder {
                badge_class: order.status.badge_class(),
                order,
            })
            .collect();

        Ok(DashboardMetrics {
            total_categories,
            total_items,
            total_orders: totals.total_orders,
            pending_orders: totals.pending_orders,
            paid_orders: totals.paid_orders,
            cancelled_orders: totals.cancelled_orders,
            revenue: totals.revenue,
            total_stock,
            recent_orders,
            top_stock_items,
            top_categories,
        })
    }
}
