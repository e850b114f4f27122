//! Shared utilities for commands
//!
//! This module contains:
//! - `ServiceOptions` - Global flags that shape the insight service
//! - `build_service` / `require_service` - Insight service from the environment
//! - `select_client` - AI client from the environment with `--model` applied
//! - `load_prompts` / `load_router` - Prompt library and routing config
//! - `load_transactions` - Read a JSON or CSV transaction file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use finpro_core::ai::{AIBackend, AIClient};
use finpro_core::import::load_file;
use finpro_core::insights::InsightService;
use finpro_core::model_router::ModelRouter;
use finpro_core::models::Transaction;
use finpro_core::prompts::PromptLibrary;

/// Global flags that shape the insight service
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub prompts_dir: Option<PathBuf>,
    pub models_config: Option<PathBuf>,
    /// `--model`: replaces the backend's default model
    pub model: Option<String>,
}

/// Prompt library from `--prompts-dir` or the default override directory
pub fn load_prompts(options: &ServiceOptions) -> Result<PromptLibrary> {
    match &options.prompts_dir {
        Some(dir) => PromptLibrary::with_override_dir(dir.clone())
            .with_context(|| format!("Failed to load prompts from {}", dir.display())),
        None => PromptLibrary::new().context("Failed to load prompts"),
    }
}

/// Routing config from `--models-config` or the default config path
pub fn load_router(options: &ServiceOptions) -> Result<ModelRouter> {
    match &options.models_config {
        Some(path) => ModelRouter::with_config_path(path.clone())
            .with_context(|| format!("Failed to load model config {}", path.display())),
        None => ModelRouter::new().context("Failed to load model config"),
    }
}

/// Apply `--model` to a configured client
pub fn with_model_override(ai: AIClient, options: &ServiceOptions) -> AIClient {
    match &options.model {
        Some(model) => ai.with_model(model),
        None => ai,
    }
}

/// AI client from the environment, or `None` when no backend is configured
pub fn select_client(options: &ServiceOptions) -> Option<AIClient> {
    AIClient::from_env().map(|ai| with_model_override(ai, options))
}

/// Insight service over an already selected client
pub fn service_with_client(ai: AIClient, options: &ServiceOptions) -> Result<InsightService> {
    tracing::debug!(
        backend = ai.backend_name(),
        model = ai.model(),
        "Using AI backend"
    );
    Ok(InsightService::new(
        ai,
        load_router(options)?,
        load_prompts(options)?,
    ))
}

/// Insight service, or `None` when no AI backend is configured
pub fn build_service(options: &ServiceOptions) -> Result<Option<InsightService>> {
    select_client(options)
        .map(|ai| service_with_client(ai, options))
        .transpose()
}

/// Insight service, failing with setup instructions when none is configured
pub fn require_service(options: &ServiceOptions) -> Result<InsightService> {
    build_service(options)?.context(
        "No AI backend configured. Set GEMINI_API_KEY, or AI_BACKEND=ollama|openai_compatible|mock",
    )
}

/// Read transactions from a JSON or CSV file
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    load_file(path).with_context(|| format!("Failed to load transactions from {}", path.display()))
}
