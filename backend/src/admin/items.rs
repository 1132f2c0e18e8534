//! Item pages

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Category, CreateItemInput, Item, UpdateItemInput};
use uuid::Uuid;

use super::layout::{alert, confirm_page, escape, money, page, pagination_nav, text_input};
use super::{is_form_error, AdminResult, PageQuery};
use crate::error::AppError;
use crate::services::{CategoryService, ItemService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
}

/// Parsed item fields
struct ItemFields {
    category_id: Uuid,
    name: String,
    price: Decimal,
    stock: i32,
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

impl ItemForm {
    fn parse(&self) -> Result<ItemFields, AppError> {
        let category_id = Uuid::parse_str(self.category_id.trim())
            .map_err(|_| invalid("category_id", "Please choose a category"))?;
        let price = Decimal::from_str(self.price.trim())
            .map_err(|_| invalid("price", "Price must be a number"))?;
        let stock = self
            .stock
            .trim()
            .parse::<i32>()
            .map_err(|_| invalid("stock", "Stock must be a whole number"))?;

        Ok(ItemFields {
            category_id,
            name: self.name.clone(),
            price,
            stock,
        })
    }
}

impl From<&Item> for ItemForm {
    fn from(item: &Item) -> Self {
        ItemForm {
            category_id: item.category_id.to_string(),
            name: item.name.clone(),
            price: item.price.to_string(),
            stock: item.stock.to_string(),
        }
    }
}

fn form_page(
    title: &str,
    action: &str,
    form: &ItemForm,
    categories: &[Category],
    error: Option<&str>,
) -> Html<String> {
    let options: String = categories
        .iter()
        .map(|category| {
            let id = category.id.to_string();
            let selected = if id == form.category_id { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{name}</option>"#,
                name = escape(&category.name)
            )
        })
        .collect();

    let body = format!(
        r#"<h1>{title}</h1>
{alert}
<form method="post" action="{action}">
  <label for="category_id">Category</label>
  <select id="category_id" name="category_id"><option value="">-- choose --</option>{options}</select>
  {name}
  {price}
  {stock}
  <p><button type="submit">Save</button> <a href="/items">Back</a></p>
</form>"#,
        title = escape(title),
        alert = alert(error),
        action = escape(action),
        name = text_input("name", "Name", &form.name),
        price = text_input("price", "Price (Rp)", &form.price),
        stock = text_input("stock", "Stock", &form.stock),
    );
    page(title, &body)
}

async fn render_form(
    state: &AppState,
    title: &str,
    action: &str,
    form: &ItemForm,
    error: Option<&str>,
) -> AdminResult<Response> {
    let categories = CategoryService::new(state.db.clone()).list_categories().await?;
    Ok(form_page(title, action, form, &categories, error).into_response())
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AdminResult<Html<String>> {
    let pagination = query.pagination(state.config.admin.page_size);
    let result = ItemService::new(state.db).list_items_page(pagination).await?;

    let rows: String = result
        .data
        .iter()
        .map(|entry| {
            format!(
                r#"<tr><td><a href="/items/{id}">{name}</a></td><td>{category}</td><td class="num">{price}</td><td class="num">{stock}</td>
<td class="actions"><a href="/items/{id}/edit">Edit</a><a href="/items/{id}/delete">Delete</a></td></tr>"#,
                id = entry.item.id,
                name = escape(&entry.item.name),
                category = escape(&entry.category_name),
                price = money(entry.item.price),
                stock = entry.item.stock,
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Items</h1>
<p><a href="/items/new">New item</a></p>
<table><tr><th>Name</th><th>Category</th><th class="num">Price</th><th class="num">Stock</th><th></th></tr>{rows}</table>
{nav}"#,
        nav = pagination_nav("/items", &result.pagination),
    );

    Ok(page("Items", &body))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let entry = ItemService::new(state.db).get_item(id).await?;

    let body = format!(
        r#"<h1>{name}</h1>
<table>
<tr><th>Category</th><td><a href="/categories/{category_id}">{category}</a></td></tr>
<tr><th>Price</th><td>{price}</td></tr>
<tr><th>Stock</th><td>{stock}</td></tr>
<tr><th>Updated</th><td>{updated}</td></tr>
</table>
<p class="actions"><a href="/items/{id}/edit">Edit</a><a href="/items/{id}/delete">Delete</a><a href="/items">Back</a></p>"#,
        name = escape(&entry.item.name),
        category_id = entry.item.category_id,
        category = escape(&entry.category_name),
        price = money(entry.item.price),
        stock = entry.item.stock,
        updated = entry.item.updated_at.format("%Y-%m-%d %H:%M"),
        id = entry.item.id,
    );

    Ok(page(&entry.item.name, &body))
}

pub async fn new_form(State(state): State<AppState>) -> AdminResult<Response> {
    render_form(&state, "New item", "/items/new", &ItemForm::default(), None).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ItemForm>,
) -> AdminResult<Response> {
    let result = match form.parse() {
        Ok(fields) => {
            let input = CreateItemInput {
                category_id: fields.category_id,
                name: fields.name,
                price: fields.price,
                stock: fields.stock,
            };
            ItemService::new(state.db.clone()).create_item(input).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(created) => Ok(Redirect::to(&format!("/items/{}", created.item.id)).into_response()),
        Err(err) if is_form_error(&err) => {
            render_form(&state, "New item", "/items/new", &form, Some(&err.client_message())).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Response> {
    let entry = ItemService::new(state.db.clone()).get_item(id).await?;
    let action = format!("/items/{}/edit", id);
    render_form(&state, "Edit item", &action, &ItemForm::from(&entry.item), None).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ItemForm>,
) -> AdminResult<Response> {
    let result = match form.parse() {
        Ok(fields) => {
            let input = UpdateItemInput {
                category_id: fields.category_id,
                name: fields.name,
                price: fields.price,
                stock: fields.stock,
            };
            ItemService::new(state.db.clone()).update_item(id, input).await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(updated) => Ok(Redirect::to(&format!("/items/{}", updated.item.id)).into_response()),
        Err(err) if is_form_error(&err) => {
            let action = format!("/items/{}/edit", id);
            render_form(&state, "Edit item", &action, &form, Some(&err.client_message())).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let entry = ItemService::new(state.db).get_item(id).await?;
    Ok(confirm_page(
        "Delete item",
        &format!("Delete item \"{}\"?", entry.item.name),
        &format!("/items/{}/delete", id),
        &format!("/items/{}", id),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Redirect> {
    ItemService::new(state.db).delete_item(id).await?;
    Ok(Redirect::to("/items"))
}
