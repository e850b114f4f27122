//! Receipt handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};

/// Request body for receipt analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeReceiptRequest {
    /// `data:` URL or bare base64 image
    pub image: String,
}

/// POST /api/receipts/analyze - Extract fields from a receipt photo
///
/// Answers 204 when nothing usable could be extracted.
pub async fn analyze_receipt(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeReceiptRequest>,
) -> Result<Response, AppError> {
    if body.image.trim().is_empty() {
        return Err(AppError::bad_request("Image is required"));
    }

    let Some(service) = &state.insights else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok(match service.analyze_receipt(&body.image).await {
        Some(extraction) => Json(extraction).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
