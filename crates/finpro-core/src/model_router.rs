//! Model Router for task-based call settings
//!
//! Resolves, per service operation, which model to ask for and how to call
//! it: sampling temperature, timeout and retry policy.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finpro/config/models.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/models.toml");

/// Task types for model routing, one per service operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Free-text advisory insight
    Insights,
    /// Structured next-period balance forecast
    Forecast,
    /// Receipt image extraction
    Receipt,
    /// Free-form question about the user's cash flow
    Advisor,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Forecast => "forecast",
            Self::Receipt => "receipt",
            Self::Advisor => "advisor",
        }
    }

    /// Get all task types
    pub fn all() -> &'static [TaskType] {
        &[Self::Insights, Self::Forecast, Self::Receipt, Self::Advisor]
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == key)
    }
}

/// Configuration for a specific task type
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Model override; `None` uses the backend's default model
    pub model: Option<String>,
    /// Sampling temperature; `None` leaves it to the endpoint
    pub temperature: Option<f32>,
    /// Timeout for a single API call
    pub timeout: Duration,
    /// Number of retries on transport-class failure
    pub max_retries: u32,
    /// Wait before the first retry, doubled for each further attempt
    pub retry_backoff: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            timeout: Duration::from_secs(30),
            max_retries: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// Settings applied to every task without its own section
    pub defaults: TaskConfig,
    /// Per-task configurations
    pub tasks: HashMap<TaskType, TaskConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            defaults: TaskConfig::default(),
            tasks: HashMap::new(),
        }
    }
}

/// Model Router for task-based call settings
#[derive(Debug, Clone)]
pub struct ModelRouter {
    config: RouterConfig,
    config_path: Option<PathBuf>,
}

impl ModelRouter {
    /// Create a new model router with default configuration
    pub fn new() -> Result<Self> {
        let config = load_config(None)?;
        Ok(Self {
            config,
            config_path: default_config_path(),
        })
    }

    /// Create with a custom config path
    pub fn with_config_path(path: PathBuf) -> Result<Self> {
        let config = load_config(Some(&path))?;
        Ok(Self {
            config,
            config_path: Some(path),
        })
    }

    /// Create with an explicit configuration (for testing)
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Create from the embedded defaults only, ignoring any override file
    pub fn embedded() -> Self {
        Self::with_config(parse_config(DEFAULT_CONFIG).unwrap_or_default())
    }

    /// Get the full task configuration
    pub fn config_for_task(&self, task: TaskType) -> TaskConfig {
        self.config
            .tasks
            .get(&task)
            .cloned()
            .unwrap_or_else(|| self.config.defaults.clone())
    }

    /// Get the model override for a task, if any
    pub fn model_for_task(&self, task: TaskType) -> Option<String> {
        self.config_for_task(task).model
    }

    /// Get the router configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Get the config path (if using file-based config)
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> Result<()> {
        self.config = load_config(self.config_path.as_ref())?;
        Ok(())
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config(RouterConfig::default()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finpro").join("config").join("models.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&PathBuf>) -> Result<RouterConfig> {
    let path = override_path.cloned().or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawTaskConfig>,
    tasks: Option<HashMap<String, RawTaskConfig>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTaskConfig {
    model: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

impl RawTaskConfig {
    /// Layer these settings over `base`
    fn apply(self, base: &TaskConfig) -> TaskConfig {
        TaskConfig {
            model: self
                .model
                .filter(|m| !m.trim().is_empty())
                .or_else(|| base.model.clone()),
            temperature: self.temperature.or(base.temperature),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.timeout),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            retry_backoff: self
                .retry_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(base.retry_backoff),
        }
    }
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<RouterConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let defaults = raw
        .defaults
        .unwrap_or_default()
        .apply(&TaskConfig::default());

    if let Some(t) = defaults.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(Error::Config(format!("temperature {} outside [0, 2]", t)));
        }
    }

    let mut tasks = HashMap::new();
    for (task_name, task_config) in raw.tasks.unwrap_or_default() {
        let Some(task) = TaskType::from_key(&task_name) else {
            tracing::warn!(task = %task_name, "Ignoring unknown task in models config");
            continue;
        };
        let resolved = task_config.apply(&defaults);
        if let Some(t) = resolved.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::Config(format!(
                    "temperature {} for task {} outside [0, 2]",
                    t, task_name
                )));
            }
        }
        tasks.insert(task, resolved);
    }

    Ok(RouterConfig { defaults, tasks })
}
