use crate::controllers::predict::post_predict;
use crate::controllers::root::get_root;
use crate::repositories::upload_repository::UploadRepository;
use crate::services::predictor::Predictor;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub struct AppContext {
    pub predictor: Predictor,
    pub uploads: UploadRepository,
}

pub type AppState = Arc<AppContext>;

pub fn router(state: AppState, public_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(get_root))
        .route("/predict", post(post_predict))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
