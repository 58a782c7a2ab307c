//! Harvest production HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::services::production::{
    CreateProductionInput, ProductionFilter, ProductionService, UpdateProductionInput,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct AlerteStockQuery {
    pub seuil: Option<Decimal>,
}

/// List harvests, optionally filtered by plantation or quality grade
pub async fn list_productions(
    State(state): State<AppState>,
    Query(filter): Query<ProductionFilter>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.get_productions(filter).await {
        Ok(productions) => (StatusCode::OK, Json(productions)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific harvest
pub async fn get_production(
    State(state): State<AppState>,
    Path(production_id): Path<i64>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.get_production(production_id).await {
        Ok(production) => (StatusCode::OK, Json(production)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a new harvest
pub async fn create_production(
    State(state): State<AppState>,
    Json(input): Json<CreateProductionInput>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.create_production(input).await {
        Ok(production) => (StatusCode::CREATED, Json(production)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a harvest
pub async fn update_production(
    State(state): State<AppState>,
    Path(production_id): Path<i64>,
    Json(input): Json<UpdateProductionInput>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.update_production(production_id, input).await {
        Ok(production) => (StatusCode::OK, Json(production)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a harvest
pub async fn delete_production(
    State(state): State<AppState>,
    Path(production_id): Path<i64>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.delete_production(production_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get aggregate production statistics
pub async fn get_production_statistics(State(state): State<AppState>) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.get_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List harvests whose remaining stock fell under the threshold percentage
pub async fn get_stock_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlerteStockQuery>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());
    let seuil = query.seuil.unwrap_or_else(|| Decimal::from(20));

    match service.get_stock_alerts(seuil).await {
        Ok(alertes) => (StatusCode::OK, Json(alertes)).into_response(),
        Err(e) => e.into_response(),
    }
}
