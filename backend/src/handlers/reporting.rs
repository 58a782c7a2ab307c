//! Reporting handlers for the dashboard and CSV exports

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::error::AppResult;
use crate::services::reporting::{DashboardMetrics, ReportingService};
use crate::AppState;

/// Get dashboard metrics
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db.clone());
    let metrics = service.get_dashboard_metrics().await?;
    Ok(Json(metrics))
}

/// Export all sales as CSV
pub async fn export_ventes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let csv = service.export_ventes_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ventes.csv\"",
            ),
        ],
        csv,
    ))
}

/// Export all cash movements as CSV
pub async fn export_mouvements(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db.clone());
    let csv = service.export_mouvements_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"mouvements_caisse.csv\"",
            ),
        ],
        csv,
    ))
}
