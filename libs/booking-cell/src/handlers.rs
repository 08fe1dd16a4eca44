// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    BookingError, CancelInquiryRequest, GenerateAvailabilityRequest, InquirySearchQuery,
    RescheduleInquiryRequest, SubmitInquiryRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::InquiryBookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::NotFound => AppError::NotFound("Inquiry not found".to_string()),
        BookingError::SlotAlreadyBooked => {
            AppError::Conflict("Time slot already booked".to_string())
        }
        BookingError::InvalidStatusTransition(status) => AppError::BadRequest(format!(
            "Inquiry cannot be modified in current status: {}",
            status
        )),
        BookingError::ValidationError(msg) => AppError::ValidationError(msg),
        BookingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// INQUIRY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn submit_inquiry(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SubmitInquiryRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .submit_inquiry(request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry,
        "message": "Inquiry submitted successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_inquiry(
    State(state): State<Arc<AppConfig>>,
    Path(inquiry_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .get_inquiry(inquiry_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry
    })))
}

#[axum::debug_handler]
pub async fn confirm_inquiry(
    State(state): State<Arc<AppConfig>>,
    Path(inquiry_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .confirm_inquiry(inquiry_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry,
        "message": "Inquiry confirmed successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_inquiry(
    State(state): State<Arc<AppConfig>>,
    Path(inquiry_id): Path<Uuid>,
    Json(request): Json<CancelInquiryRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .cancel_inquiry(inquiry_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry,
        "message": "Inquiry cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_inquiry(
    State(state): State<Arc<AppConfig>>,
    Path(inquiry_id): Path<Uuid>,
    Json(request): Json<RescheduleInquiryRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .reschedule_inquiry(inquiry_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry,
        "message": "Inquiry rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn complete_inquiry(
    State(state): State<Arc<AppConfig>>,
    Path(inquiry_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiry = service
        .complete_inquiry(inquiry_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "inquiry": inquiry,
        "message": "Inquiry completed successfully"
    })))
}

#[axum::debug_handler]
pub async fn search_inquiries(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<InquirySearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let inquiries = service
        .search_inquiries(query)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "count": inquiries.len(),
        "inquiries": inquiries
    })))
}

#[axum::debug_handler]
pub async fn get_inquiry_stats(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let stats = service
        .get_inquiry_stats()
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "stats": stats
    })))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = InquiryBookingService::new(&state);
    let slots = service
        .available_slots(query.date)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "date": query.date,
        "count": slots.len(),
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn generate_availability(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<GenerateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let generated = service
        .generate(request.start_date, request.end_date, &request.settings)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "generated": generated,
        "message": "Availability generated successfully"
    })))
}
