//! Settings document endpoints.
//!
//! The store does synchronous file I/O (fsync included), so every call runs
//! on the blocking pool.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tixctl_core::settings::{inject_remote_url, strip_derived_fields};
use tixctl_core::SettingsError;
use tracing::{info, warn};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
}

/// GET /load
///
/// Full settings document with the derived `advanced.remote_url` filled in.
pub async fn load(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(state.settings());
    let (_, mut document) = blocking("load", move || store.load()).await?;

    inject_remote_url(&mut document, state.remote_url());
    Ok(Json(document))
}

/// POST /save
///
/// The body is parsed by hand so malformed JSON gets the same `{error}`
/// body and 500 status as a failed write.
pub async fn save(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    let mut document: Value = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    strip_derived_fields(&mut document);

    let store = Arc::clone(state.settings());
    blocking("save", move || store.save(&document)).await?;

    info!(path = %state.settings().path().display(), "settings saved from control panel");
    Ok(Json(SaveResponse { status: "success" }))
}

/// Run a store operation on the blocking pool; any failure is a 500.
async fn blocking<T, F>(operation: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, SettingsError> + Send + 'static,
    T: Send + 'static,
{
    let result = match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    result.map_err(|error| {
        warn!(operation, %error, "settings store operation failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, error)
    })
}
