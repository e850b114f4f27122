//! Mock backend for testing
//!
//! Returns canned responses per task, or replays a scripted queue of replies
//! and failures. Every request is recorded so tests can assert on what was
//! sent and how many calls were made.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model_router::TaskType;

use super::types::GenerateRequest;
use super::AIBackend;

/// One scripted outcome for the next `generate` call
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Model text
    Text(String),
    /// A successful call with no text
    Empty,
    /// An HTTP error from the endpoint
    Fail { status: u16 },
    /// Sleep before answering with the task's canned reply
    Hang(Duration),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Mock AI backend for testing
///
/// Healthy by default. Scripted replies are consumed in order; once the
/// queue is empty each task gets its canned reply.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    model: String,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            model: "mock".to_string(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a backend that replays `replies` in order
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let backend = Self::new();
        lock(&backend.replies).extend(replies);
        backend
    }

    /// Create a new instance with a different model name
    ///
    /// The scripted queue and the request log stay shared with `self`.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Queue another scripted reply
    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.requests).clone()
    }

    /// Number of `generate` calls received
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Canned reply used when no scripted reply is queued
    pub fn default_reply(task: TaskType) -> &'static str {
        match task {
            TaskType::Insights => {
                "Seu fluxo de caixa está positivo. Mantenha as despesas fixas abaixo de 60% da receita."
            }
            TaskType::Forecast => {
                r#"{"predictedBalance": 0, "confidenceScore": 0.5, "riskLevel": "MEDIUM", "explanation": "Previsão simulada."}"#
            }
            TaskType::Receipt => {
                r#"{"amount": 0.0, "date": "2024-01-01", "description": "Recibo simulado", "categorySuggestion": "Outros"}"#
            }
            TaskType::Advisor => "Com base nos seus dados, priorize reduzir despesas variáveis.",
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
        lock(&self.requests).push(request.clone());
        let scripted = lock(&self.replies).pop_front();

        match scripted {
            Some(MockReply::Text(text)) => Ok(Some(text)),
            Some(MockReply::Empty) => Ok(None),
            Some(MockReply::Fail { status }) => Err(Error::Backend {
                status,
                body: "mock failure".to_string(),
            }),
            Some(MockReply::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(Some(Self::default_reply(request.task).to_string()))
            }
            None => Ok(Some(Self::default_reply(request.task).to_string())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
