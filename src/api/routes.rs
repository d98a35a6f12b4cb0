//! Route table and middleware for the forecast API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::predictor::CashflowPredictor;

/// Create the service router.
///
/// # Routes
/// - `GET /` - Usage message
/// - `GET /health` - Liveness probe
/// - `POST /predict` - Forecast from a 7x6 sequence
pub fn create_router(predictor: Arc<CashflowPredictor>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::info))
        .route("/health", get(handlers::liveness))
        .route("/predict", post(handlers::predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(predictor)
}
