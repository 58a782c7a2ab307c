//! Plantation management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::services::plantation::{
    CreatePlantationInput, PlantationService, UpdatePlantationInput,
};
use crate::AppState;

/// List all plantations with their activity counters
pub async fn list_plantations(State(state): State<AppState>) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.get_plantations().await {
        Ok(plantations) => (StatusCode::OK, Json(plantations)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific plantation
pub async fn get_plantation(
    State(state): State<AppState>,
    Path(plantation_id): Path<i64>,
) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.get_plantation(plantation_id).await {
        Ok(plantation) => (StatusCode::OK, Json(plantation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new plantation
pub async fn create_plantation(
    State(state): State<AppState>,
    Json(input): Json<CreatePlantationInput>,
) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.create_plantation(input).await {
        Ok(plantation) => (StatusCode::CREATED, Json(plantation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a plantation
pub async fn update_plantation(
    State(state): State<AppState>,
    Path(plantation_id): Path<i64>,
    Json(input): Json<UpdatePlantationInput>,
) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.update_plantation(plantation_id, input).await {
        Ok(plantation) => (StatusCode::OK, Json(plantation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a plantation
pub async fn delete_plantation(
    State(state): State<AppState>,
    Path(plantation_id): Path<i64>,
) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.delete_plantation(plantation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get plantation statistics
pub async fn get_plantation_statistics(
    State(state): State<AppState>,
    Path(plantation_id): Path<i64>,
) -> impl IntoResponse {
    let service = PlantationService::new(state.db.clone());

    match service.get_plantation_statistics(plantation_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
