use crate::services::predictor::PredictError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

const PREDICT_FAILED: &str = "Failed to classify image";

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        error!("Prediction failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: PREDICT_FAILED,
            }),
        )
            .into_response()
    }
}
