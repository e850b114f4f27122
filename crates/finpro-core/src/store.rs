//! Session transaction store
//!
//! The dashboard keeps the user's transactions only for the lifetime of the
//! session. [`InMemoryStore`] does the same for the HTTP server; nothing is
//! written to disk.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// A transaction with its session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: u64,
    #[serde(flatten)]
    pub transaction: Transaction,
}

/// Storage for the session's transactions
pub trait TransactionStore: Send + Sync {
    /// All transactions in insertion order
    fn list(&self) -> Result<Vec<StoredTransaction>>;

    /// Add transactions, returning them with their new ids
    fn add(&self, transactions: Vec<Transaction>) -> Result<Vec<StoredTransaction>>;

    /// Remove one transaction by id
    fn remove(&self, id: u64) -> Result<()>;

    /// Remove everything, returning how many were removed
    fn clear(&self) -> Result<usize>;

    /// Just the transactions, without ids
    fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.list()?.into_iter().map(|s| s.transaction).collect())
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    items: Vec<StoredTransaction>,
}

/// Process-local store behind a `RwLock`
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::InvalidData("Transaction store lock poisoned".into())
}

impl TransactionStore for InMemoryStore {
    fn list(&self) -> Result<Vec<StoredTransaction>> {
        Ok(self.inner.read().map_err(poisoned)?.items.clone())
    }

    fn add(&self, transactions: Vec<Transaction>) -> Result<Vec<StoredTransaction>> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let mut added = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            inner.next_id += 1;
            let stored = StoredTransaction {
                id: inner.next_id,
                transaction,
            };
            inner.items.push(stored.clone());
            added.push(stored);
        }
        Ok(added)
    }

    fn remove(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let before = inner.items.len();
        inner.items.retain(|s| s.id != id);
        if inner.items.len() == before {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let removed = inner.items.len();
        inner.items.clear();
        Ok(removed)
    }
}
