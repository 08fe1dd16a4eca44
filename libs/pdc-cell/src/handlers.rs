// libs/pdc-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePdcRequest, PdcError, PdcSearchQuery};
use crate::services::pdc::PdcService;

fn map_pdc_error(e: PdcError) -> AppError {
    match e {
        PdcError::NotFound => AppError::NotFound("Check not found".to_string()),
        PdcError::DuplicateCheckNumber => {
            AppError::Conflict("Check number already exists".to_string())
        }
        PdcError::InvalidStatusTransition(status) => AppError::BadRequest(format!(
            "Check cannot be modified in current status: {}",
            status
        )),
        PdcError::ValidationError(msg) => AppError::ValidationError(msg),
        PdcError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_pdc(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePdcRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PdcService::new(&state);
    let pdc = service.create_pdc(request).await.map_err(map_pdc_error)?;

    Ok(Json(json!({
        "success": true,
        "check": pdc,
        "message": "Check registered successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_pdc(
    State(state): State<Arc<AppConfig>>,
    Path(pdc_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PdcService::new(&state);
    let pdc = service.get_pdc(pdc_id).await.map_err(map_pdc_error)?;

    Ok(Json(json!({
        "success": true,
        "check": pdc
    })))
}

#[axum::debug_handler]
pub async fn search_pdcs(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<PdcSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PdcService::new(&state);
    let checks = service.search_pdcs(query).await.map_err(map_pdc_error)?;

    Ok(Json(json!({
        "success": true,
        "count": checks.len(),
        "checks": checks
    })))
}

#[axum::debug_handler]
pub async fn cancel_pdc(
    State(state): State<Arc<AppConfig>>,
    Path(pdc_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PdcService::new(&state);
    let pdc = service.cancel_pdc(pdc_id).await.map_err(map_pdc_error)?;

    Ok(Json(json!({
        "success": true,
        "check": pdc,
        "message": "Check cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn sweep_due_checks(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = PdcService::new(&state);
    let issued = service.sweep_due_checks().await.map_err(map_pdc_error)?;

    Ok(Json(json!({
        "success": true,
        "issued": issued.len(),
        "checks": issued
    })))
}
