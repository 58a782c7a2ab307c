//! Field operation HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::services::operation::{
    CreateOperationInput, OperationFilter, OperationService, UpdateOperationInput,
};
use crate::AppState;

/// List operations, optionally filtered by plantation or kind
pub async fn list_operations(
    State(state): State<AppState>,
    Query(filter): Query<OperationFilter>,
) -> impl IntoResponse {
    let service = OperationService::new(state.db.clone());

    match service.get_operations(filter).await {
        Ok(operations) => (StatusCode::OK, Json(operations)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific operation
pub async fn get_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<i64>,
) -> impl IntoResponse {
    let service = OperationService::new(state.db.clone());

    match service.get_operation(operation_id).await {
        Ok(operation) => (StatusCode::OK, Json(operation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a new operation
pub async fn create_operation(
    State(state): State<AppState>,
    Json(input): Json<CreateOperationInput>,
) -> impl IntoResponse {
    let service = OperationService::new(state.db.clone());

    match service.create_operation(input).await {
        Ok(operation) => (StatusCode::CREATED, Json(operation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an operation
pub async fn update_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<i64>,
    Json(input): Json<UpdateOperationInput>,
) -> impl IntoResponse {
    let service = OperationService::new(state.db.clone());

    match service.update_operation(operation_id, input).await {
        Ok(operation) => (StatusCode::OK, Json(operation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an operation
pub async fn delete_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<i64>,
) -> impl IntoResponse {
    let service = OperationService::new(state.db.clone());

    match service.delete_operation(operation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
