//! Sale HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shared::Periode;

use crate::services::vente::{CreateVenteInput, UpdateVenteInput, VenteFilter, VenteService};
use crate::AppState;

/// List sales, optionally filtered by plantation or client
pub async fn list_ventes(
    State(state): State<AppState>,
    Query(filter): Query<VenteFilter>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.get_ventes(filter).await {
        Ok(ventes) => (StatusCode::OK, Json(ventes)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific sale
pub async fn get_vente(
    State(state): State<AppState>,
    Path(vente_id): Path<i64>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.get_vente(vente_id).await {
        Ok(vente) => (StatusCode::OK, Json(vente)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a new sale, debiting the harvest stock
pub async fn create_vente(
    State(state): State<AppState>,
    Json(input): Json<CreateVenteInput>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.create_vente(input).await {
        Ok(vente) => (StatusCode::CREATED, Json(vente)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a sale, re-settling the harvest stock
pub async fn update_vente(
    State(state): State<AppState>,
    Path(vente_id): Path<i64>,
    Json(input): Json<UpdateVenteInput>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.update_vente(vente_id, input).await {
        Ok(vente) => (StatusCode::OK, Json(vente)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a sale, returning its quantity to the harvest stock
pub async fn delete_vente(
    State(state): State<AppState>,
    Path(vente_id): Path<i64>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.delete_vente(vente_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get revenue over an optional date range
pub async fn get_chiffre_affaires(
    State(state): State<AppState>,
    Query(periode): Query<Periode>,
) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.get_chiffre_affaires(periode).await {
        Ok(ca) => (StatusCode::OK, Json(ca)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get aggregate sale statistics
pub async fn get_vente_statistics(State(state): State<AppState>) -> impl IntoResponse {
    let service = VenteService::new(state.db.clone());

    match service.get_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
