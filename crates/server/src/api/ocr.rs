//! CAPTCHA OCR endpoint, available only when a solver is configured.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    /// Base64 image, optionally as a `data:<mime>;base64,` URL
    pub image_data: String,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub answer: String,
    pub duration_ms: u64,
}

/// POST /ocr
pub async fn solve(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OcrResponse>, ApiError> {
    let Some(solver) = state.solver() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "OCR captcha solving is not available",
        ));
    };

    let request: OcrRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let image = decode_image(&request.image_data)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid image_data: {}", e)))?;

    let start = Instant::now();
    let answer = solver
        .solve(&image)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    debug!(solver = solver.name(), duration_ms, "captcha solved");
    Ok(Json(OcrResponse {
        answer,
        duration_ms,
    }))
}

fn decode_image(image_data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = match image_data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image_data,
    };
    base64::engine::general_purpose::STANDARD.decode(encoded.trim())
}
