//! Worker command endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tixctl_core::RunOutcome;
use tracing::info;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PauseResponse {
    pub pause: bool,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub resume: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run: bool,
}

/// GET /pause
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<Json<PauseResponse>, ApiError> {
    state
        .controller()
        .pause()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(Json(PauseResponse { pause: true }))
}

/// GET /resume
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResumeResponse>, ApiError> {
    state
        .controller()
        .resume()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(Json(ResumeResponse { resume: true }))
}

/// GET /run
///
/// Fire-and-forget: answers `{run: true}` whether or not the worker started.
/// Launch failures are visible through `/status`.
pub async fn run(State(state): State<Arc<AppState>>) -> Json<RunResponse> {
    info!("run button pressed");
    if let RunOutcome::Failed { reason } = state.controller().run() {
        info!(%reason, "run reported as accepted despite launch failure");
    }
    Json(RunResponse { run: true })
}
