//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model_router::TaskType;

/// API credential for a remote model endpoint
///
/// Read once from the environment at construction. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// An image sent inline with a request (base64 payload, no data-URL prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Render as a `data:` URL (used by OpenAI-style APIs)
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One piece of user content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

/// JSON value types a response schema can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    String,
    Number,
}

impl SchemaType {
    /// JSON Schema spelling (OpenAI, Ollama)
    fn json_schema_name(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::String => "string",
            Self::Number => "number",
        }
    }

    /// OpenAPI spelling used by Gemini's `responseSchema`
    fn openapi_name(&self) -> &'static str {
        match self {
            Self::Object => "OBJECT",
            Self::String => "STRING",
            Self::Number => "NUMBER",
        }
    }
}

/// Declared shape of a structured model response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub kind: SchemaType,
    pub enum_values: Vec<String>,
    pub properties: Vec<(String, ResponseSchema)>,
    pub required: Vec<String>,
}

impl ResponseSchema {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            enum_values: Vec::new(),
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    /// Restrict a string to a fixed set of values
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Add a required property
    pub fn required(mut self, name: &str, schema: ResponseSchema) -> Self {
        self.required.push(name.to_string());
        self.properties.push((name.to_string(), schema));
        self
    }

    /// Add an optional property
    pub fn optional(mut self, name: &str, schema: ResponseSchema) -> Self {
        self.properties.push((name.to_string(), schema));
        self
    }

    /// Render as standard JSON Schema
    pub fn to_json_schema(&self) -> Value {
        self.render(SchemaType::json_schema_name)
    }

    /// Render as the OpenAPI subset Gemini accepts
    pub fn to_openapi(&self) -> Value {
        self.render(SchemaType::openapi_name)
    }

    fn render(&self, type_name: fn(&SchemaType) -> &'static str) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(type_name(&self.kind)));
        if !self.enum_values.is_empty() {
            out.insert("enum".into(), json!(self.enum_values));
        }
        if !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.render(type_name)))
                .collect();
            out.insert("properties".into(), Value::Object(props));
        }
        if !self.required.is_empty() {
            out.insert("required".into(), json!(self.required));
        }
        Value::Object(out)
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Which service operation issued the request
    pub task: TaskType,
    /// Per-task model override; backends use their default when `None`
    pub model: Option<String>,
    /// System instruction, sent separately from the user content
    pub system: Option<String>,
    pub parts: Vec<ContentPart>,
    pub temperature: Option<f32>,
    /// When set, the backend asks for JSON conforming to this schema
    pub response_schema: Option<ResponseSchema>,
}

impl GenerateRequest {
    pub fn new(task: TaskType) -> Self {
        Self {
            task,
            model: None,
            system: None,
            parts: Vec::new(),
            temperature: None,
            response_schema: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.parts.push(ContentPart::Image(image));
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// All text parts joined into a single prompt
    pub fn text_prompt(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Inline images in request order
    pub fn images(&self) -> impl Iterator<Item = &InlineImage> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::Image(img) => Some(img),
            ContentPart::Text(_) => None,
        })
    }
}

/// Backend identity for status display
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub backend: &'static str,
    pub model: String,
    pub host: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.expose(), "super-secret");
    }

    #[test]
    fn test_schema_renderings() {
        let schema = ResponseSchema::object()
            .required("riskLevel", ResponseSchema::string().one_of(&["LOW", "HIGH"]))
            .optional("confidenceScore", ResponseSchema::number());

        let json_schema = schema.to_json_schema();
        assert_eq!(json_schema["type"], "object");
        assert_eq!(json_schema["properties"]["riskLevel"]["enum"][1], "HIGH");
        assert_eq!(json_schema["required"], json!(["riskLevel"]));

        let openapi = schema.to_openapi();
        assert_eq!(openapi["type"], "OBJECT");
        assert_eq!(openapi["properties"]["confidenceScore"]["type"], "NUMBER");
    }

    #[test]
    fn test_text_prompt_skips_images() {
        let request = GenerateRequest::new(TaskType::Receipt)
            .with_image(InlineImage {
                mime_type: "image/jpeg".into(),
                data: "AAAA".into(),
            })
            .with_text("first")
            .with_text("second");
        assert_eq!(request.text_prompt(), "first\n\nsecond");
        assert_eq!(request.images().count(), 1);
    }

    #[test]
    fn test_blank_system_is_dropped() {
        let request = GenerateRequest::new(TaskType::Insights).with_system(Some("  ".into()));
        assert!(request.system.is_none());
    }
}
