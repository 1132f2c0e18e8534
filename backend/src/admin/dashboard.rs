//! Dashboard page

use axum::{extract::State, response::Html};

use super::layout::{escape, money, page, status_badge};
use super::AdminResult;
use crate::services::ReportingService;
use crate::AppState;

pub async fn index(State(state): State<AppState>) -> AdminResult<Html<String>> {
    let metrics = ReportingService::new(state.db).get_dashboard().await?;

    let cards = [
        ("Categories", metrics.total_categories.to_string()),
        ("Items", metrics.total_items.to_string()),
        ("Units in stock", metrics.total_stock.to_string()),
        ("Orders", metrics.total_orders.to_string()),
        ("Pending", metrics.pending_orders.to_string()),
        ("Paid", metrics.paid_orders.to_string()),
        ("Cancelled", metrics.cancelled_orders.to_string()),
        ("Revenue", money(metrics.revenue)),
    ]
    .iter()
    .map(|(label, value)| format!(r#"<div class="card">{}<strong>{}</strong></div>"#, label, value))
    .collect::<String>();

    let recent_rows: String = metrics
        .recent_orders
        .iter()
        .map(|recent| {
            format!(
                r#"<tr><td><a href="/orders/{id}">{number}</a></td><td>{date}</td><td>{badge}</td><td class="num">{total}</td></tr>"#,
                id = recent.order.id,
                number = escape(&recent.order.order_number),
                date = recent.order.order_date.format("%Y-%m-%d %H:%M"),
                badge = status_badge(recent.order.status),
                total = money(recent.order.total_amount),
            )
        })
        .collect();

    let stock_rows: String = metrics
        .top_stock_items
        .iter()
        .map(|entry| {
            format!(
                r#"<tr><td><a href="/items/{id}">{name}</a></td><td>{category}</td><td class="num">{stock}</td></tr>"#,
                id = entry.item.id,
                name = escape(&entry.item.name),
                category = escape(&entry.category_name),
                stock = entry.item.stock,
            )
        })
        .collect();

    let category_rows: String = metrics
        .top_categories
        .iter()
        .map(|category| {
            format!(
                r#"<tr><td><a href="/categories/{id}">{name}</a></td><td class="num">{count}</td></tr>"#,
                id = category.id,
                name = escape(&category.name),
                count = category.item_count,
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Dashboard</h1>
<div class="cards">{cards}</div>
<h2>Recent orders</h2>
<table><tr><th>Order</th><th>Date</th><th>Status</th><th class="num">Total</th></tr>{recent_rows}</table>
<h2>Most stocked items</h2>
<table><tr><th>Item</th><th>Category</th><th class="num">Stock</th></tr>{stock_rows}</table>
<h2>Largest categories</h2>
<table><tr><th>Category</th><th class="num">Items</th></tr>{category_rows}</table>"#
    );

    Ok(page("Dashboard", &body))
}
