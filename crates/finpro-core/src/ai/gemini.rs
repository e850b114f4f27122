//! Gemini backend implementation
//!
//! HTTP client for the Google Generative Language API (`generateContent`).
//! Supports system instructions, inline images and schema-constrained JSON
//! output, which covers every task the insight service issues.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEMINI_API_KEY`: API key (required)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.5-flash)
//! - `GEMINI_HOST`: API base URL (default: https://generativelanguage.googleapis.com)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::parsing::preview;
use super::types::{ApiKey, ContentPart, GenerateRequest};
use super::AIBackend;

/// Default Gemini API host
pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend
///
/// The API key is fixed at construction and sent as a header on every call;
/// it never appears in URLs or logs.
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: ApiKey,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, model: &str, api_key: ApiKey) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `GEMINI_API_KEY`
    /// Optional: `GEMINI_MODEL`, `GEMINI_HOST`
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let host =
            std::env::var("GEMINI_HOST").unwrap_or_else(|_| DEFAULT_GEMINI_HOST.to_string());
        Some(Self::new(&host, &model, ApiKey::new(api_key)))
    }

    fn build_body(request: &GenerateRequest) -> GenerateContentRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => GeminiPart::Text { text: text.clone() },
                ContentPart::Image(img) => GeminiPart::InlineData {
                    inline_data: InlineData {
                        mime_type: img.mime_type.clone(),
                        data: img.data.clone(),
                    },
                },
            })
            .collect();

        let (response_mime_type, response_schema) = match &request.response_schema {
            Some(schema) => (Some("application/json"), Some(schema.to_openapi())),
            None => (None, None),
        };

        GenerateContentRequest {
            system_instruction: request.system.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text { text: s.clone() }],
            }),
            contents: vec![GeminiContent {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type,
                response_schema,
            },
        }
    }
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// `generateContent` response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when there is none
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl AIBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = Self::build_body(request);

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header(API_KEY_HEADER, self.api_key.expose())
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

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text();
        debug!(task = request.task.as_str(), model, "Gemini response: {:?}", text);
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/v1beta/models/{}", self.base_url, self.model))
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{InlineImage, ResponseSchema};
    use crate::model_router::TaskType;

    #[test]
    fn test_body_shape_with_schema_and_image() {
        let request = GenerateRequest::new(TaskType::Receipt)
            .with_system(Some("be precise".into()))
            .with_image(InlineImage {
                mime_type: "image/jpeg".into(),
                data: "QUJD".into(),
            })
            .with_text("extract")
            .with_temperature(Some(0.4))
            .with_schema(ResponseSchema::object().required("amount", ResponseSchema::number()));

        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be precise");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "extract");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_body_without_schema_omits_json_mode() {
        let request = GenerateRequest::new(TaskType::Insights).with_text("hello");
        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Olá, "},{"text":"mundo"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Olá, mundo"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = GeminiBackend::new("http://localhost:9999/", "gemini-test", ApiKey::new("k"));
        assert_eq!(backend.host(), "http://localhost:9999");
        assert_eq!(backend.model(), "gemini-test");
    }
}
