//! Gemini `generateContent` REST client

use super::{InferenceClient, InferenceError, InferenceRequest, InferenceResponse, ModelKind, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const USER_AGENT: &str = concat!("xuanji-oracle/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings resolved from configuration
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    /// No local timeout when `None`
    pub request_timeout: Option<Duration>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: None,
        }
    }
}

// ---- wire format ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => WirePart {
                text: Some(text),
                inline_data: None,
            },
            Part::InlineData { mime_type, data } => WirePart {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            },
        }
    }
}

fn into_parts(wire: Vec<WirePart>) -> Vec<Part> {
    wire.into_iter()
        .flat_map(|p| {
            let text = p.text.map(Part::Text);
            let image = p.inline_data.map(|d| Part::InlineData {
                mime_type: d.mime_type,
                data: d.data,
            });
            text.into_iter().chain(image)
        })
        .collect()
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| InferenceError::NetworkError(e.to_string()))?;

        if settings.api_key.is_none() {
            warn!("Gemini API key not configured; generation endpoints will return 503");
        }

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn model_for(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Text => &self.settings.text_model,
            ModelKind::Image => &self.settings.image_model,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait::async_trait]
impl InferenceClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(InferenceError::MissingCredential)?;

        let model = self.model_for(request.model).to_string();
        let generation_config = match (&request.response_mime_type, &request.response_schema) {
            (None, None) => None,
            _ => Some(GenerationConfig {
                response_mime_type: request.response_mime_type.clone(),
                response_schema: request.response_schema.clone(),
            }),
        };
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: request.parts.into_iter().map(WirePart::from).collect(),
            }],
            generation_config,
        };

        debug!(model = %model, "Sending generateContent request");

        let response = self
            .http_client
            .post(self.endpoint(&model))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(InferenceError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::ApiError(status.as_u16(), error_text));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::ParseError(e.to_string()))?;

        let candidate = reply
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::EmptyResponse("no candidates".to_string()))?;

        let parts = into_parts(candidate.content.map(|c| c.parts).unwrap_or_default());

        info!(model = %model, parts = parts.len(), "Gemini generation successful");

        Ok(InferenceResponse { parts })
    }
}
