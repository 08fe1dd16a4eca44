// libs/pdc-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn pdc_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_pdc).get(handlers::search_pdcs))
        .route("/search", get(handlers::search_pdcs))
        .route("/sweep", post(handlers::sweep_due_checks))
        .route("/{pdc_id}", get(handlers::get_pdc))
        .route("/{pdc_id}/cancel", post(handlers::cancel_pdc))
        .with_state(state)
}
