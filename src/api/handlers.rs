//! Request handlers and response mapping for the forecast API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::PredictError;
use crate::predictor::{CashflowPredictor, Forecast};
use crate::sequence::{Sequence, ShapeMismatch};

pub const USAGE_MESSAGE: &str =
    "Welcome to the Cash Flow Prediction API. Use POST /predict with a valid sequence.";

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `POST /predict`: one row of features per time step.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub sequence: Vec<Vec<f64>>,
}

/// Outcome of a predict call as it goes on the wire.
///
/// A wrong input shape is reported with status 200 and an `error` field;
/// existing clients read it from the body.
#[derive(Debug)]
pub enum PredictResponse {
    Forecast(Forecast),
    ShapeMismatch(ShapeMismatch),
    Failed(PredictError),
    BadRequest(String),
}

impl IntoResponse for PredictResponse {
    fn into_response(self) -> Response {
        match self {
            PredictResponse::Forecast(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
            PredictResponse::ShapeMismatch(mismatch) => (
                StatusCode::OK,
                Json(json!({ "error": mismatch.to_string() })),
            )
                .into_response(),
            PredictResponse::Failed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": err.to_string() })),
            )
                .into_response(),
            PredictResponse::BadRequest(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": detail })),
            )
                .into_response(),
        }
    }
}

/// `GET /`
pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: USAGE_MESSAGE.to_string(),
    })
}

/// `GET /health`
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /predict`
pub async fn predict(
    State(predictor): State<Arc<CashflowPredictor>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> PredictResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected predict body: {}", rejection.body_text());
            return PredictResponse::BadRequest(rejection.body_text());
        }
    };

    let sequence = match Sequence::parse(request.sequence) {
        Ok(sequence) => sequence,
        Err(mismatch) => {
            warn!("{}", mismatch);
            return PredictResponse::ShapeMismatch(mismatch);
        }
    };

    match predictor.predict(&sequence) {
        Ok(forecast) => PredictResponse::Forecast(forecast),
        Err(err) => {
            error!("Prediction failed: {}", err);
            PredictResponse::Failed(err)
        }
    }
}
