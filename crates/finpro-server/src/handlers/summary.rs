//! Dashboard summary handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{AppError, AppState};
use finpro_core::models::Transaction;
use finpro_core::summary::{CashFlowSummary, Period};

/// Query parameters for period-filtered endpoints
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// all, week, month or year (default all)
    pub period: Option<String>,
}

/// Parse the optional `period` parameter
pub(crate) fn resolve_period(period: Option<&str>) -> Result<Period, AppError> {
    match period {
        None | Some("") => Ok(Period::All),
        Some(p) => p.parse().map_err(|e: String| AppError::bad_request(&e)),
    }
}

/// Reference date for period filters
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Session transactions inside the requested period
pub(crate) fn session_transactions(
    state: &AppState,
    period: Period,
) -> Result<Vec<Transaction>, AppError> {
    Ok(period.filter(&state.store.transactions()?, today()))
}

/// GET /api/summary - Income, expenses, balance and category totals
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<CashFlowSummary>, AppError> {
    let period = resolve_period(params.period.as_deref())?;
    let transactions = session_transactions(&state, period)?;
    Ok(Json(CashFlowSummary::from_transactions(&transactions)))
}
