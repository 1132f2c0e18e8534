//! Server-rendered admin pages
//!
//! Lists are paged by `?page=N`. Forms post back to the same URL and redirect
//! on success; a rejected form is rendered again with the error shown above it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::Pagination;

use crate::error::AppError;
use crate::AppState;

mod categories;
mod dashboard;
mod items;
pub mod layout;
mod orders;

/// Admin page routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/categories", get(categories::index))
        .route(
            "/categories/new",
            get(categories::new_form).post(categories::create),
        )
        .route("/categories/:id", get(categories::show))
        .route(
            "/categories/:id/edit",
            get(categories::edit_form).post(categories::update),
        )
        .route(
            "/categories/:id/delete",
            get(categories::confirm_delete).post(categories::delete),
        )
        .route("/items", get(items::index))
        .route("/items/new", get(items::new_form).post(items::create))
        .route("/items/:id", get(items::show))
        .route("/items/:id/edit", get(items::edit_form).post(items::update))
        .route(
            "/items/:id/delete",
            get(items::confirm_delete).post(items::delete),
        )
        .route("/orders", get(orders::index))
        .route("/orders/new", get(orders::new_form).post(orders::create))
        .route("/orders/:id", get(orders::show))
        .route("/orders/:id/edit", get(orders::edit_form).post(orders::update))
        .route(
            "/orders/:id/delete",
            get(orders::confirm_delete).post(orders::delete),
        )
        .route("/orders/:id/cancel", post(orders::cancel))
}

/// `?page=N` on the admin lists
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self, page_size: u32) -> Pagination {
        Pagination::new(self.page.unwrap_or(1), page_size)
    }
}

/// Error raised by an admin page, rendered as an HTML error page
#[derive(Debug)]
pub struct AdminError(pub AppError);

impl From<AppError> for AdminError {
    fn from(err: AppError) -> Self {
        AdminError(err)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = self.0.status_and_code();

        if status.is_server_error() {
            tracing::error!("Admin page failed: {:?}", self.0);
        } else {
            tracing::warn!("Admin page rejected request: {}", self.0);
        }

        let body = format!(
            r#"<h1>{status}</h1>
<div class="alert"><strong>{code}</strong>: {message}</div>
<p><a href="/">Back to the dashboard</a></p>"#,
            status = status.as_u16(),
            code = code,
            message = layout::escape(&self.0.client_message()),
        );

        (status, layout::page("Error", &body)).into_response()
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Whether a failure should be shown on the submitted form instead of an error page
pub fn is_form_error(err: &AppError) -> bool {
    err.status_and_code().0 == StatusCode::BAD_REQUEST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_to_first_page() {
        let pagination = PageQuery::default().pagination(10);
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 10);

        let pagination = PageQuery { page: Some(0) }.pagination(10);
        assert_eq!(pagination.page, 1);
    }

    #[test]
    fn test_admin_error_keeps_status() {
        let response = AdminError(AppError::not_found("Order", "x")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_form_errors() {
        assert!(is_form_error(&AppError::InsufficientStock("low".into())));
        assert!(!is_form_error(&AppError::not_found("Item", "x")));
    }
}
