// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Inquiry lifecycle
        .route("/inquiries", post(handlers::submit_inquiry))
        .route("/inquiries/search", get(handlers::search_inquiries))
        .route("/inquiries/stats", get(handlers::get_inquiry_stats))
        .route("/inquiries/{inquiry_id}", get(handlers::get_inquiry))
        .route("/inquiries/{inquiry_id}/confirm", post(handlers::confirm_inquiry))
        .route("/inquiries/{inquiry_id}/cancel", post(handlers::cancel_inquiry))
        .route("/inquiries/{inquiry_id}/reschedule", patch(handlers::reschedule_inquiry))
        .route("/inquiries/{inquiry_id}/complete", post(handlers::complete_inquiry))

        // Timeslot availability
        .route("/slots", get(handlers::get_available_slots))
        .route("/slots/generate", post(handlers::generate_availability))

        .with_state(state)
}
