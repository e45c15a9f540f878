use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{control, handlers, middleware::cors_middleware, ocr, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Status
        .route("/version", get(handlers::version))
        .route("/status", get(handlers::status))
        .route("/question", get(handlers::question))
        // Worker commands
        .route("/pause", get(control::pause))
        .route("/resume", get(control::resume))
        .route("/run", get(control::run))
        // Settings document
        .route("/load", get(settings::load))
        .route("/save", post(settings::save))
        // CAPTCHA
        .route("/ocr", post(ocr::solve))
        .with_state(state)
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
}
