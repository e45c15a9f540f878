//! Status endpoints: version, worker status, pending question.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response with the given status.
pub fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// true while the pause marker is absent
    pub status: bool,
    pub last_url: String,
    /// stopped, running or paused
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub exists: bool,
    pub question: String,
}

/// GET /version
pub async fn version(State(state): State<Arc<AppState>>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.version().to_string(),
    })
}

/// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let signals = state.signals();
    Json(StatusResponse {
        status: !signals.is_paused(),
        last_url: signals.read_last_url(),
        state: state.controller().state().as_str(),
        launch_error: signals.read_launch_failure(),
    })
}

/// GET /question
pub async fn question(State(state): State<Arc<AppState>>) -> Json<QuestionResponse> {
    let pending = state.signals().read_pending_question();
    Json(QuestionResponse {
        exists: pending.exists,
        question: pending.text,
    })
}
