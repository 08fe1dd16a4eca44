use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use pdc_cell::router::pdc_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Back-office API is running!" }))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/pdcs", pdc_routes(state.clone()))
}
