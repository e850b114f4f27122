//! Error types for FinPro

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Model API error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether a retry could plausibly succeed (transport failures, timeouts,
    /// rate limiting and server-side errors). Parse failures and client errors
    /// are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => match e.status() {
                Some(status) => status.as_u16() == 429 || status.is_server_error(),
                None => !e.is_decode(),
            },
            Error::Timeout(_) => true,
            Error::Backend { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(Error::Backend {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(Error::Backend {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(!Error::Backend {
            status: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!Error::InvalidData("bad json".into()).is_retryable());
    }
}
