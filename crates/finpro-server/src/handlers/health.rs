//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use finpro_core::ai::{AIBackend, BackendInfo};

/// Response for the /api/health endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Configured AI backend, if any
    pub ai: Option<BackendInfo>,
    /// Whether the AI backend answered its health check
    pub ai_available: bool,
}

/// GET /api/health - Server and AI backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (ai, ai_available) = match &state.insights {
        Some(service) => (Some(service.ai().info()), service.ai().health_check().await),
        None => (None, false),
    };

    Json(HealthResponse {
        status: "ok",
        ai,
        ai_available,
    })
}
