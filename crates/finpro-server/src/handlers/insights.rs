//! AI insight, forecast and advisor handlers
//!
//! These never fail because of the model: text endpoints always return a
//! displayable reply and the forecast answers 204 when there is none.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::summary::{resolve_period, session_transactions, PeriodQuery};
use crate::{AppError, AppState};
use finpro_core::insights::InsightReply;
use finpro_core::summary::Period;

/// Request body for the advisor
#[derive(Debug, Deserialize)]
pub struct AdvisorRequest {
    pub question: String,
}

/// GET /api/insights - Strategic insights about the session's transactions
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<InsightReply>, AppError> {
    let period = resolve_period(params.period.as_deref())?;
    let transactions = session_transactions(&state, period)?;

    let reply = match &state.insights {
        Some(service) => service.get_insights(&transactions).await,
        None => InsightReply::unavailable(),
    };
    Ok(Json(reply))
}

/// GET /api/forecast - Next-period balance forecast, 204 when absent
pub async fn get_forecast(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let Some(service) = &state.insights else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let transactions = session_transactions(&state, Period::All)?;
    Ok(match service.get_forecast(&transactions).await {
        Some(forecast) => Json(forecast).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// POST /api/advisor - Answer a question about the session's transactions
pub async fn ask_advisor(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdvisorRequest>,
) -> Result<Json<InsightReply>, AppError> {
    let transactions = session_transactions(&state, Period::All)?;

    let reply = match &state.insights {
        Some(service) => service.ask_advisor(&transactions, &body.question).await,
        None => InsightReply::unavailable(),
    };
    Ok(Json(reply))
}
