use crate::app::AppState;
use crate::repositories::upload_repository::UploadError;
use crate::services::predictor::{PredictError, PredictionResult};
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use tracing::info;

pub async fn post_predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, PredictError> {
    let multipart = multipart.map_err(UploadError::from)?;
    let upload = state.uploads.receive(multipart).await?;
    let result = state.predictor.predict(upload.path()).await?;
    info!(
        "Predicted {} ({}) for {}",
        result.prediction,
        result.confidence,
        upload.path().display()
    );
    Ok(Json(result))
}
