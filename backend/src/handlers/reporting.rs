//! Reporting handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::reporting::{DashboardMetrics, ReportingService};
use crate::AppState;

/// Get dashboard metrics
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db);
    let metrics = service.get_dashboard().await?;
    Ok(Json(metrics))
}
