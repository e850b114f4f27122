//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. Structured tasks pass
//! the response schema as `format`, which recent Ollama versions enforce.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::parsing::preview;
use super::types::GenerateRequest;
use super::AIBackend;

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
        }
    }

    /// Create a new instance with a different model
    ///
    /// Used for runtime model override (e.g., user selects a different model for testing)
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            default_model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn build_body(&self, request: &GenerateRequest) -> OllamaRequest {
        OllamaRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
            system: request.system.clone(),
            prompt: request.text_prompt(),
            images: request.images().map(|img| img.data.clone()).collect(),
            format: request
                .response_schema
                .as_ref()
                .map(|schema| schema.to_json_schema()),
            options: request.temperature.map(|temperature| OllamaOptions { temperature }),
            stream: false,
        }
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
        let body = self.build_body(request);

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status,
                body: preview(&body),
            });
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(
            task = request.task.as_str(),
            "Ollama response: {}", ollama_response.response
        );

        if ollama_response.response.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(ollama_response.response))
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
