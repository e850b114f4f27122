//! Prompt Library for the insight service
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finpro/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This allows users to customize prompts without modifying the source,
//! while automatically getting new default prompts on upgrade.
//!
//! Every prompt is read when the library is built, so a library can be
//! shared read-only between concurrent requests.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const FINANCIAL_INSIGHTS: &str = include_str!("../../../prompts/financial_insights.md");
    pub const FINANCIAL_FORECAST: &str = include_str!("../../../prompts/financial_forecast.md");
    pub const ANALYZE_RECEIPT: &str = include_str!("../../../prompts/analyze_receipt.md");
    pub const FINANCIAL_ADVISOR: &str = include_str!("../../../prompts/financial_advisor.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    FinancialInsights,
    FinancialForecast,
    AnalyzeReceipt,
    FinancialAdvisor,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialInsights => "financial_insights",
            Self::FinancialForecast => "financial_forecast",
            Self::AnalyzeReceipt => "analyze_receipt",
            Self::FinancialAdvisor => "financial_advisor",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::FinancialInsights,
            Self::FinancialForecast,
            Self::AnalyzeReceipt,
            Self::FinancialAdvisor,
        ]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::FinancialInsights => defaults::FINANCIAL_INSIGHTS,
            Self::FinancialForecast => defaults::FINANCIAL_FORECAST,
            Self::AnalyzeReceipt => defaults::ANALYZE_RECEIPT,
            Self::FinancialAdvisor => defaults::FINANCIAL_ADVISOR,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.md", self.as_str())
    }
}

impl std::str::FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| Error::NotFound(format!("prompt '{}'", s)))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Task type for model routing (insights, forecast, receipt, advisor)
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the prompt with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(&self.content, vars)
    }

    /// Render just the system section with variables
    pub fn render_system(&self, vars: &HashMap<&str, &str>) -> Option<String> {
        self.system_section().map(|s| render_template(s, vars))
    }

    /// Render just the user section with variables
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => self.render(vars),
        }
    }
}

/// Prompt library holding every known prompt
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    /// Override directory path
    override_dir: Option<PathBuf>,
    /// Parsed prompts
    prompts: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Result<Self> {
        Self::load(default_prompts_dir())
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Result<Self> {
        Self::load(Some(path))
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        let prompts = PromptId::all()
            .iter()
            .filter_map(|&id| {
                parse_prompt(id.default_content())
                    .map(|(metadata, body)| {
                        (
                            id,
                            Prompt {
                                metadata,
                                content: body,
                                is_override: false,
                                override_path: None,
                            },
                        )
                    })
                    .ok()
            })
            .collect();
        Self {
            override_dir: None,
            prompts,
        }
    }

    fn load(override_dir: Option<PathBuf>) -> Result<Self> {
        let mut prompts = HashMap::new();
        for &id in PromptId::all() {
            prompts.insert(id, load_prompt(override_dir.as_ref(), id)?);
        }
        Ok(Self {
            override_dir,
            prompts,
        })
    }

    /// Get a prompt by ID
    pub fn get(&self, id: PromptId) -> Result<&Prompt> {
        self.prompts
            .get(&id)
            .ok_or_else(|| Error::Prompt(format!("prompt {} not loaded", id.as_str())))
    }

    /// List all prompts with their override status
    pub fn list(&self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let prompt = self.prompts.get(&id);
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    task_type: prompt
                        .map(|p| p.metadata.task_type.clone())
                        .unwrap_or_default(),
                    has_override: prompt.is_some_and(|p| p.is_override),
                    override_path: prompt.and_then(|p| p.override_path.clone()),
                }
            })
            .collect()
    }

    /// Check if a prompt has an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_dir
            .as_ref()
            .is_some_and(|dir| dir.join(id.file_name()).exists())
    }

    /// Get the override directory path
    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Re-read every prompt (after editing override files)
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::load(self.override_dir.take())?;
        Ok(())
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    /// Prompt identifier
    pub id: String,
    /// Version from metadata
    pub version: u32,
    /// Task type for model routing
    pub task_type: String,
    /// Whether an override exists
    pub has_override: bool,
    /// Path to override file (if exists)
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finpro").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load_prompt(override_dir: Option<&PathBuf>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(id.file_name());
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::Prompt(format!(
                    "Failed to read override {}: {}",
                    override_path.display(),
                    e
                ))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim_start_matches('\u{feff}').trim();

    let Some(rest) = content.strip_prefix("---") else {
        return Err(Error::Prompt(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    };

    let end = rest.find("---").ok_or_else(|| {
        Error::Prompt("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Up to the next top-level header
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditionals, then substitute `{{var}}` placeholders in one pass
///
/// Substituted values are never rescanned, so a value containing `{{x}}`
/// is inserted literally.
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let resolved = remove_unmatched_conditionals(template, vars);
    let mut out = String::with_capacity(resolved.len());
    let mut rest = resolved.as_str();

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let name = after[..close].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Keep `{{#if var}}...{{/if}}` blocks whose variable is set, drop the rest
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    loop {
        let Some(if_start) = result.find("{{#if ") else {
            break;
        };
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim().to_string();
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = result[block_start..block_start + endif_pos].to_string();
        let full_end = block_start + endif_pos + 7;

        let should_include = vars
            .get(var_name.as_str())
            .is_some_and(|v| !v.trim().is_empty());

        result = if should_include {
            format!("{}{}{}", &result[..if_start], block_content, &result[full_end..])
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
task_type: insights
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert_eq!(metadata.task_type, "insights");
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nno metadata").is_err());
        assert!(parse_prompt("---\nid: x\n# System").is_err());
    }

    #[test]
    fn test_extract_section() {
        let content = r#"# System
System content here.

# User
User content here."#;

        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(
            extract_section(content, "# User"),
            Some("User content here.")
        );
    }

    #[test]
    fn test_render_substitutes_once() {
        let mut vars = HashMap::new();
        vars.insert("question", "o que é {{transactions}}?");
        vars.insert("transactions", "[]");

        let rendered = render_template("Q: {{question}} T: {{transactions}} U: {{unknown}}", &vars);
        assert_eq!(rendered, "Q: o que é {{transactions}}? T: [] U: {{unknown}}");
    }

    #[test]
    fn test_conditional_blocks() {
        let content = "Start{{#if category}}\nCategory: {{category}}{{/if}}\nEnd";

        let mut vars = HashMap::new();
        vars.insert("category", "Alimentação");
        let result = render_template(content, &vars);
        assert!(result.contains("Category: Alimentação"));

        let empty_vars: HashMap<&str, &str> = HashMap::new();
        let result = render_template(content, &empty_vars);
        assert!(!result.contains("Category:"));
        assert!(result.contains("Start"));
        assert!(result.contains("End"));
    }

    #[test]
    fn test_prompt_library_embedded() {
        let lib = PromptLibrary::embedded_only();

        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert!(!prompt.is_override);
            assert!(prompt.system_section().is_some());
            assert!(prompt.user_section().is_some());
        }
    }

    #[test]
    fn test_default_prompts_parse() {
        for id in PromptId::all() {
            let result = parse_prompt(id.default_content());
            assert!(
                result.is_ok(),
                "Failed to parse {}: {:?}",
                id.as_str(),
                result.err()
            );

            let (metadata, _) = result.unwrap();
            assert_eq!(
                metadata.id,
                id.as_str(),
                "Prompt ID mismatch for {}",
                id.as_str()
            );
        }
    }

    #[test]
    fn test_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("financial_insights.md"),
            "---\nid: financial_insights\nversion: 9\ntask_type: insights\n---\n# System\nCustom\n\n# User\n{{transactions}}",
        )
        .unwrap();

        let lib = PromptLibrary::with_override_dir(dir.path().to_path_buf()).unwrap();
        let prompt = lib.get(PromptId::FinancialInsights).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(prompt.system_section(), Some("Custom"));
        assert!(lib.has_override(PromptId::FinancialInsights));
        assert!(!lib.has_override(PromptId::AnalyzeReceipt));

        let listed = lib.list();
        assert_eq!(listed.len(), PromptId::all().len());
        assert!(listed.iter().any(|p| p.id == "financial_insights" && p.has_override));
    }

    #[test]
    fn test_broken_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("analyze_receipt.md"), "no frontmatter").unwrap();
        assert!(PromptLibrary::with_override_dir(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_prompt_id_from_str() {
        assert_eq!(
            "financial_forecast".parse::<PromptId>().unwrap(),
            PromptId::FinancialForecast
        );
        assert!("explain_spending".parse::<PromptId>().is_err());
    }
}
