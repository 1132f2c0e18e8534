//! Category pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use shared::{Category, CreateCategoryInput, UpdateCategoryInput};
use uuid::Uuid;

use super::layout::{alert, confirm_page, escape, money, page, pagination_nav, text_input};
use super::{is_form_error, AdminResult, PageQuery};
use crate::services::{CategoryService, ItemService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    fn description(&self) -> Option<String> {
        let description = self.description.trim();
        (!description.is_empty()).then(|| description.to_string())
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        CategoryForm {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

fn form_page(title: &str, action: &str, form: &CategoryForm, error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>{title}</h1>
{alert}
<form method="post" action="{action}">
  {name}
  <label for="description">Description</label>
  <textarea id="description" name="description" rows="3">{description}</textarea>
  <p><button type="submit">Save</button> <a href="/categories">Back</a></p>
</form>"#,
        title = escape(title),
        alert = alert(error),
        action = escape(action),
        name = text_input("name", "Name", &form.name),
        description = escape(&form.description),
    );
    page(title, &body)
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AdminResult<Html<String>> {
    let pagination = query.pagination(state.config.admin.page_size);
    let result = CategoryService::new(state.db)
        .list_categories_page(pagination)
        .await?;

    let rows: String = result
        .data
        .iter()
        .map(|category| {
            format!(
                r#"<tr><td><a href="/categories/{id}">{name}</a></td><td>{description}</td>
<td class="actions"><a href="/categories/{id}/edit">Edit</a><a href="/categories/{id}/delete">Delete</a></td></tr>"#,
                id = category.id,
                name = escape(&category.name),
                description = escape(category.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Categories</h1>
<p><a href="/categories/new">New category</a></p>
<table><tr><th>Name</th><th>Description</th><th></th></tr>{rows}</table>
{nav}"#,
        nav = pagination_nav("/categories", &result.pagination),
    );

    Ok(page("Categories", &body))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let category = CategoryService::new(state.db.clone()).get_category(id).await?;
    let items = ItemService::new(state.db).list_items_by_category(id).await?;

    let rows: String = items
        .iter()
        .map(|entry| {
            format!(
                r#"<tr><td><a href="/items/{id}">{name}</a></td><td class="num">{price}</td><td class="num">{stock}</td></tr>"#,
                id = entry.item.id,
                name = escape(&entry.item.name),
                price = money(entry.item.price),
                stock = entry.item.stock,
            )
        })
        .collect();

    let body = format!(
        r#"<h1>{name}</h1>
<p>{description}</p>
<p class="actions"><a href="/categories/{id}/edit">Edit</a><a href="/categories/{id}/delete">Delete</a><a href="/categories">Back</a></p>
<h2>Items</h2>
<table><tr><th>Name</th><th class="num">Price</th><th class="num">Stock</th></tr>{rows}</table>"#,
        name = escape(&category.name),
        description = escape(category.description.as_deref().unwrap_or("")),
        id = category.id,
    );

    Ok(page(&category.name, &body))
}

pub async fn new_form() -> Html<String> {
    form_page("New category", "/categories/new", &CategoryForm::default(), None)
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> AdminResult<Response> {
    let input = CreateCategoryInput {
        name: form.name.clone(),
        description: form.description(),
    };

    match CategoryService::new(state.db).create_category(input).await {
        Ok(category) => Ok(Redirect::to(&format!("/categories/{}", category.id)).into_response()),
        Err(err) if is_form_error(&err) => Ok(form_page(
            "New category",
            "/categories/new",
            &form,
            Some(&err.client_message()),
        )
        .into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let category = CategoryService::new(state.db).get_category(id).await?;
    let action = format!("/categories/{}/edit", id);
    Ok(form_page("Edit category", &action, &CategoryForm::from(&category), None))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<CategoryForm>,
) -> AdminResult<Response> {
    let input = UpdateCategoryInput {
        name: form.name.clone(),
        description: form.description(),
    };

    match CategoryService::new(state.db).update_category(id, input).await {
        Ok(category) => Ok(Redirect::to(&format!("/categories/{}", category.id)).into_response()),
        Err(err) if is_form_error(&err) => {
            let action = format!("/categories/{}/edit", id);
            Ok(form_page("Edit category", &action, &form, Some(&err.client_message()))
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Html<String>> {
    let category = CategoryService::new(state.db).get_category(id).await?;
    Ok(confirm_page(
        "Delete category",
        &format!(
            "Delete category \"{}\" and all of its items?",
            category.name
        ),
        &format!("/categories/{}/delete", id),
        &format!("/categories/{}", id),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AdminResult<Redirect> {
    CategoryService::new(state.db).delete_category(id).await?;
    Ok(Redirect::to("/categories"))
}
