//! FinPro Core Library
//!
//! Shared functionality for the FinPro cash-flow dashboard:
//! - Financial insight service over a remote generative model
//! - Pluggable model backends (Gemini, OpenAI-compatible, Ollama, mock)
//! - Model router for per-task model, timeout and retry policy
//! - Prompt library for customizable AI prompts
//! - Transaction import from JSON and CSV exports
//! - Cash-flow summaries and a session transaction store

pub mod ai;
pub mod error;
pub mod import;
pub mod insights;
pub mod model_router;
pub mod models;
pub mod prompts;
pub mod store;
pub mod summary;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, ApiKey, BackendInfo, GeminiBackend, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use error::{Error, Result};
pub use import::{load_file, parse_transactions, ImportFormat};
pub use insights::{InsightOutcome, InsightReply, InsightService};
pub use model_router::{ModelRouter, RouterConfig, TaskConfig, TaskType};
pub use models::{FinancialForecast, ReceiptExtraction, RiskLevel, Transaction, TransactionType};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use store::{InMemoryStore, StoredTransaction, TransactionStore};
pub use summary::{CashFlowSummary, CategoryTotal, Period};
