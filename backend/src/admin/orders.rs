//! Order pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use shared::{
    CreateOrderInput, ItemWithCategory, OrderDetail, OrderLineChange, OrderLineInput, OrderStatus,
    UpdateOrderInput,
};
use uuid::Uuid;

use super::layout::{alert, confirm_page, escape, money, page, pagination_nav, status_badge};
use super::{is_form_error, AdminResult, PageQuery};
use crate::error::AppError;
use crate::services::{ItemService, OrderService};
use crate::AppState;

/// Empty line rows offered on the order forms
const BLANK_ROWS: usize = 3;

/// Submitted order form; the line fields repeat once per row
#[derive(Debug, Default, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub line_id: Vec<String>,
    #[serde(default)]
    pub item_id: Vec<String>,
    #[serde(default)]
    pub quantity: Vec<String>,
}

/// One row of the line table as shown on the form
struct LineRow {
    line_id: String,
    item_id: String,
    quantity: String,
}

fn invalid(field: &str, message: String) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message,
    }
}

impl OrderForm {
    fn rows(&self) -> Vec<LineRow> {
        (0..self.item_id.len())
            .map(|i| LineRow {
                line_id: self.line_id.get(i).cloned().unwrap_or_default(),
                item_id: self.item_id[i].clone(),
                quantity: self.quantity.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Rows with an item chosen, as line changes
    fn line_changes(&self) -> Result<Vec<OrderLineChange>, AppError> {
        let mut changes = Vec::new();

        for (i, row) in self.rows().iter().enumerate() {
            if row.item_id.trim().is_empty() {
                continue;
            }

            let item_id = Uuid::parse_str(row.item_id.trim())
                .map_err(|_| invalid("item_id", format!("Line {}: unknown item", i + 1)))?;
            let quantity = row.quantity.trim().parse::<i32>().map_err(|_| {
                invalid("quantity", format!("Line {}: quantity must be a whole number", i + 1))
            })?;
            let id = match row.line_id.trim() {
                "" => None,
                raw => Some(
                    Uuid::parse_str(raw)
                        .map_err(|_| invalid("line_id", format!("Line {}: malformed line", i + 1)))?,
                ),
            };

            changes.push(OrderLineChange {
                id,
                item_id,
                quantity,
            });
        }

        Ok(changes)
    }

    fn line_inputs(&self) -> Result<Vec<OrderLineInput>, AppError> {
        Ok(self
            .line_changes()?
            .into_iter()
            .map(|change| OrderLineInput {
                item_id: change.item_id,
                quantity: change.quantity,
            })
            .collect())
    }

    fn status(&self) -> Result<OrderStatus, AppError> {
        self.status
            .parse()
            .map_err(|_| invalid("status", format!("Unknown order status: {}", self.status)))
    }
}

impl From<&OrderDetail> for OrderForm {
    fn from(detail: &OrderDetail) -> Self {
        OrderForm {
            status: detail.order.status.as_str().to_string(),
            line_id: detail.order_items.iter().map(|l| l.id.to_string()).collect(),
            item_id: detail.order_items.iter().map(|l| l.item_id.to_string()).collect(),
            quantity: detail.order_items.iter().map(|l| l.quantity.to_string()).collect(),
        }
    }
}

fn line_row_html(items: &[ItemWithCategory], row: &LineRow) -> String {
    let options: String = items
        .iter()
        .map(|entry| {
            let id = entry.item.id.to_string();
            let selected = if id == row.item_id { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{name} ({price}, stock {stock})</option>"#,
                name = escape(&entry.item.name),
                price = money(entry.item.price),
                stock = entry.item.stock,
            )
        })
        .collect();

    format!(
        r#"<tr><td><input type="hidden" name="line_id" value="{line_id}">
<select name="item_id"><option value="">-- none --</option>{options}</select></td>
<td><input type="number" name="quantity" min="1" value="{quantity}"></td></tr>"#,
        line_id = escape(&row.line_id),
        quantity = escape(&row.quantity),
    )
}

fn form_page(
    title: &str,
    action: &str,
    form: &OrderForm,
    items: &[ItemWithCategory],
    with_status: bool,
    error: Option<&str>,
) -> Html<String> {
    let mut rows = form.rows();
    rows.extend((0..BLANK_ROWS).map(|_| LineRow {
        line_id: String::new(),
        item_id: String::new(),
        quantity: String::new(),
    }));
    let line_rows: String = rows.iter().map(|row| line_row_html(items, row)).collect();

    let status_field = if with_status {
        let options: String = OrderStatus::ALL
            .iter()
            .map(|status| {
                let selected = if status.as_str() == form.status.to_ascii_uppercase() {
                    " selected"
                } else {
                    ""
                };
                format!(r#"<option value="{s}"{selected}>{s}</option>"#, s = status.as_str())
            })
            .collect();
        format!(r#"<label for="status">Status</label><select id="status" name="status">{options}</select>"#)
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>{title}</h1>
{alert}
<form method="post" action="{action}">
  {status_field}
  <table><tr><th>Item</th><th>Quantity</th></tr>{line_rows}</table>
  <p><button type="submit">Save</button> <a href="/orders">Back</a></p>
</form>"#,
        title = escape(title),
        alert = alert(error),
        action = escape(action),
    );
    page(title, &body)
}

async fn render_form(
    state: &AppState,
    title: &str,
    action: &str,
    form: &OrderForm,
    with_status: bool,
    error: Option<&str>,
) -> AdminResult<Response> {
    let items = ItemService::new(state.db.clone()).list_items().await?;
    Ok(form_page(title, action, form, &items, with_status, error).into_response())
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AdminResult<Html<String>> {
    let pagination = query.pagination(state.config.admin.page_size);
    let result = OrderService::new(state.db).list_orders_page(pagination).await?;

    let rows: String = result
        .data
        .iter()
        .map(|detail| {
            let order = &detail.order;
            let edit = if order.status.is_cancelled() {
                String::new()
            } else {
                format!(r#"<a href="/orders/{}/edit">Edit</a>"#, order.id)
            };
            format!(
                r#"<tr><td><a href="/orders/{id}">{number}</a></td><td>{date}</td><td>{badge}</td><td class="num">{lines}</td><td class="num">{total}</td>
<td class="actions">{edit}<a href="/orders/{id}/delete">Delete</a></td></tr>"#,
                id = order.id,
                number = escape(&order.order_number),
                date = order.order_date.format("%Y-%m-%d %H:%M"),
                badge = status_badge(order.status),
                lines = detail.order_items.len(),
                total = money(order.total_amount),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Orders</h1>
<p><a href="/orders/new">New order</a></p>
<table><tr><th>Order</th><th>Date</th><th>Status</th><th class="num">Lines</th><th class="num">Total</th><th></th></tr>{rows}</table>
{nav}"#,
        nav = pagination_nav("/orders", &result.pagination),
    );

    Ok(page("Orders", &body))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let detail = OrderService::new(state.db).get_order(id).await?;
    let order = &detail.order;

    let rows: String = detail
        .order_items
        .iter()
        .map(|line| {
            format!(
                r#"<tr><td><a href="/items/{item_id}">{name}</a></td><td class="num">{quantity}</td><td class="num">{price}</td><td class="num">{subtotal}</td></tr>"#,
                item_id = line.item_id,
                name = escape(&line.item_name),
                quantity = line.quantity,
                price = money(line.price),
                subtotal = money(line.subtotal),
            )
        })
        .collect();

    let actions = if order.status.is_cancelled() {
        String::new()
    } else {
        format!(
            r#"<a href="/orders/{id}/edit">Edit</a>
<form class="inline" method="post" action="/orders/{id}/cancel"><button type="submit">Cancel order</button></form>"#,
            id = order.id
        )
    };

    let body = format!(
        r#"<h1>Order {number}</h1>
<p>{date} {badge}</p>
<table><tr><th>Item</th><th class="num">Quantity</th><th class="num">Price</th><th class="num">Subtotal</th></tr>{rows}
<tr><th colspan="3">Total</th><th class="num">{total}</th></tr></table>
<p class="actions">{actions}<a href="/orders/{id}/delete">Delete</a><a href="/orders">Back</a></p>"#,
        number = escape(&order.order_number),
        date = order.order_date.format("%Y-%m-%d %H:%M"),
        badge = status_badge(order.status),
        total = money(order.total_amount),
        id = order.id,
    );

    Ok(page(&order.order_number, &body))
}

pub async fn new_form(State(state): State<AppState>) -> AdminResult<Response> {
    render_form(&state, "New order", "/orders/new", &OrderForm::default(), false, None).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<OrderForm>,
) -> AdminResult<Response> {
    let result = match form.line_inputs() {
        Ok(order_items) => {
            OrderService::new(state.db.clone())
                .create_order(CreateOrderInput { order_items })
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(detail) => Ok(Redirect::to(&format!("/orders/{}", detail.order.id)).into_response()),
        Err(err) if is_form_error(&err) => {
            render_form(&state, "New order", "/orders/new", &form, false, Some(&err.client_message()))
                .await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Response> {
    let detail = OrderService::new(state.db.clone()).get_order(id).await?;
    if detail.order.status.is_cancelled() {
        return Err(AppError::conflict("order", "Cannot edit a cancelled order").into());
    }

    let action = format!("/orders/{}/edit", id);
    let title = format!("Edit order {}", detail.order.order_number);
    render_form(&state, &title, &action, &OrderForm::from(&detail), true, None).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<OrderForm>,
) -> AdminResult<Response> {
    let input = form.status().and_then(|status| {
        Ok(UpdateOrderInput {
            status,
            order_items: form.line_changes()?,
        })
    });

    let result = match input {
        Ok(input) => OrderService::new(state.db.clone()).update_order(id, input).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(detail) => Ok(Redirect::to(&format!("/orders/{}", detail.order.id)).into_response()),
        Err(err) if is_form_error(&err) => {
            let action = format!("/orders/{}/edit", id);
            render_form(&state, "Edit order", &action, &form, true, Some(&err.client_message()))
                .await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Redirect> {
    OrderService::new(state.db).cancel_order(id).await?;
    Ok(Redirect::to(&format!("/orders/{}", id)))
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let detail = OrderService::new(state.db).get_order(id).await?;
    Ok(confirm_page(
        "Delete order",
        &format!(
            "Delete order {}? Stock taken by its lines is not given back.",
            detail.order.order_number
        ),
        &format!("/orders/{}/delete", id),
        &format!("/orders/{}", id),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Redirect> {
    OrderService::new(state.db).delete_order(id).await?;
    Ok(Redirect::to("/orders"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rows_are_skipped() {
        let item = Uuid::new_v4();
        let form = OrderForm {
            status: String::new(),
            line_id: vec![String::new(), String::new()],
            item_id: vec![item.to_string(), String::new()],
            quantity: vec!["2".to_string(), String::new()],
        };

        let lines = form.line_inputs().unwrap();
        assert_eq!(
            lines,
            vec![OrderLineInput {
                item_id: item,
                quantity: 2
            }]
        );
    }

    #[test]
    fn test_existing_line_ids_are_kept() {
        let line = Uuid::new_v4();
        let item = Uuid::new_v4();
        let form = OrderForm {
            status: "paid".to_string(),
            line_id: vec![line.to_string()],
            item_id: vec![item.to_string()],
            quantity: vec!["4".to_string()],
        };

        assert_eq!(form.status().unwrap(), OrderStatus::Paid);
        let changes = form.line_changes().unwrap();
        assert_eq!(changes[0].id, Some(line));
        assert_eq!(changes[0].quantity, 4);
    }

    #[test]
    fn test_bad_quantity_names_the_line() {
        let form = OrderForm {
            status: "PENDING".to_string(),
            line_id: vec![],
            item_id: vec![Uuid::new_v4().to_string()],
            quantity: vec!["many".to_string()],
        };

        match form.line_changes() {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "quantity");
                assert!(message.starts_with("Line 1"));
            }
            _ => panic!("expected a quantity validation error"),
        }
    }
}
