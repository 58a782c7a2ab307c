//! Cash book HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use shared::Periode;

use crate::services::caisse::{
    CaisseService, CreateMouvementInput, MouvementFilter, UpdateMouvementInput,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct SerieQuery {
    pub limit: Option<i64>,
}

/// List cash movements, optionally filtered by kind
pub async fn list_mouvements(
    State(state): State<AppState>,
    Query(filter): Query<MouvementFilter>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.get_mouvements(filter).await {
        Ok(mouvements) => (StatusCode::OK, Json(mouvements)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific cash movement
pub async fn get_mouvement(
    State(state): State<AppState>,
    Path(mouvement_id): Path<i64>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.get_mouvement(mouvement_id).await {
        Ok(mouvement) => (StatusCode::OK, Json(mouvement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a new cash movement
pub async fn create_mouvement(
    State(state): State<AppState>,
    Json(input): Json<CreateMouvementInput>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.create_mouvement(input).await {
        Ok(mouvement) => (StatusCode::CREATED, Json(mouvement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a cash movement
pub async fn update_mouvement(
    State(state): State<AppState>,
    Path(mouvement_id): Path<i64>,
    Json(input): Json<UpdateMouvementInput>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.update_mouvement(mouvement_id, input).await {
        Ok(mouvement) => (StatusCode::OK, Json(mouvement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a cash movement
pub async fn delete_mouvement(
    State(state): State<AppState>,
    Path(mouvement_id): Path<i64>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.delete_mouvement(mouvement_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the cash balance over an optional date range
pub async fn get_bilan(
    State(state): State<AppState>,
    Query(periode): Query<Periode>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());

    match service.get_bilan(periode).await {
        Ok(bilan) => (StatusCode::OK, Json(bilan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the chart series over the most recent movements
pub async fn get_serie(
    State(state): State<AppState>,
    Query(query): Query<SerieQuery>,
) -> impl IntoResponse {
    let service = CaisseService::new(state.db.clone());
    let limit = query.limit.unwrap_or(6);

    match service.get_serie(limit).await {
        Ok(serie) => (StatusCode::OK, Json(serie)).into_response(),
        Err(e) => e.into_response(),
    }
}
