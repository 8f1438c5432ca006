//! Remote model inference
//!
//! Generators never talk to a vendor API directly; they hold an
//! `Arc<dyn InferenceClient>` and send provider-neutral requests. The Gemini
//! implementation lives in [`gemini`]; tests substitute a scripted fake.
//!
//! # Example
//! ```rust,ignore
//! use xuanji_oracle::inference::{InferenceClient, InferenceRequest};
//!
//! let request = InferenceRequest::json_text("Return {\"ok\": true}", None);
//! let response = client.generate(request).await?;
//! let value = response.json()?;
//! ```

pub mod gemini;

use serde_json::Value;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiSettings};

/// Inference client errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("API key missing")]
    MissingCredential,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("No image generated")]
    NoImage,
}

/// Which configured model a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Text and JSON generation
    Text,
    /// Image editing / generation
    Image,
}

/// One piece of request or response content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload with its MIME type
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: ModelKind,
    pub parts: Vec<Part>,
    /// e.g. `application/json`
    pub response_mime_type: Option<String>,
    /// OpenAPI-style schema the reply should follow
    pub response_schema: Option<Value>,
}

impl InferenceRequest {
    /// Text prompt expecting a JSON reply
    pub fn json_text(prompt: impl Into<String>, schema: Option<Value>) -> Self {
        Self {
            model: ModelKind::Text,
            parts: vec![Part::Text(prompt.into())],
            response_mime_type: Some("application/json".to_string()),
            response_schema: schema,
        }
    }

    /// Image followed by an instruction, expecting a JSON reply
    pub fn json_image(image: Part, prompt: impl Into<String>, schema: Option<Value>) -> Self {
        Self {
            model: ModelKind::Text,
            parts: vec![image, Part::Text(prompt.into())],
            response_mime_type: Some("application/json".to_string()),
            response_schema: schema,
        }
    }

    /// Image followed by an edit instruction, sent to the image model
    pub fn image_edit(image: Part, instruction: impl Into<String>) -> Self {
        Self {
            model: ModelKind::Image,
            parts: vec![image, Part::Text(instruction.into())],
            response_mime_type: None,
            response_schema: None,
        }
    }

    /// Concatenated text parts (used by fakes and for logging)
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parts of the first candidate of a reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceResponse {
    pub parts: Vec<Part>,
}

impl InferenceResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(text.into())],
        }
    }

    /// All text parts joined; empty when the reply carried none
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect()
    }

    /// Parse the reply text as JSON
    ///
    /// An empty reply parses as `{}` so every field reads as absent.
    /// Markdown code fences around the payload are tolerated.
    pub fn json(&self) -> Result<Value, InferenceError> {
        let text = self.text();
        let trimmed = strip_code_fence(text.trim());
        if trimmed.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(trimmed).map_err(|e| {
            InferenceError::ParseError(format!("reply is not JSON ({}): {}", e, preview(trimmed)))
        })
    }

    /// First inline image as `(mime_type, base64 data)`
    pub fn first_image(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|p| match p {
            Part::InlineData { mime_type, data } if !data.is_empty() => {
                Some((mime_type.as_str(), data.as_str()))
            }
            _ => None,
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

/// Provider-neutral inference seam
///
/// Implementations must be cheap to share (`Arc<dyn InferenceClient>`).
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether a usable credential is configured
    ///
    /// Generators check this before building any request.
    fn has_credential(&self) -> bool;

    /// Send one request; no retries
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;
}
