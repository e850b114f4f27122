//! Session transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use finpro_core::models::Transaction;
use finpro_core::store::StoredTransaction;
use finpro_core::Error;

/// Body for POST /api/transactions: one transaction or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NewTransactions {
    Many(Vec<Transaction>),
    One(Transaction),
}

impl NewTransactions {
    fn into_vec(self) -> Vec<Transaction> {
        match self {
            Self::Many(list) => list,
            Self::One(tx) => vec![tx],
        }
    }
}

/// Response for clearing the session
#[derive(Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// GET /api/transactions - List the session's transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredTransaction>>, AppError> {
    Ok(Json(state.store.list()?))
}

/// POST /api/transactions - Add one or many transactions
pub async fn add_transactions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTransactions>,
) -> Result<Json<Vec<StoredTransaction>>, AppError> {
    let transactions = body.into_vec();
    if let Some(bad) = transactions.iter().find(|t| !t.amount.is_finite()) {
        return Err(AppError::bad_request(&format!(
            "Invalid amount for transaction on {}",
            bad.date
        )));
    }

    let added = state.store.add(transactions)?;
    info!(count = added.len(), "Added transactions");
    Ok(Json(added))
}

/// DELETE /api/transactions/:id - Remove one transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SuccessResponse>, AppError> {
    match state.store.remove(id) {
        Ok(()) => Ok(Json(SuccessResponse { success: true })),
        Err(Error::NotFound(_)) => Err(AppError::not_found("Transaction not found")),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/transactions - Clear the session
pub async fn clear_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, AppError> {
    let removed = state.store.clear()?;
    info!(removed, "Cleared session transactions");
    Ok(Json(ClearResponse { removed }))
}
