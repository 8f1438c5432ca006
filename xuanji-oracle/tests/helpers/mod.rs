//! Shared fixtures for xuanji-oracle integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use xuanji_almanac::ChartOptions;
use xuanji_oracle::inference::{InferenceClient, InferenceError, InferenceRequest, InferenceResponse, Part};
use xuanji_oracle::{build_router, AppState};

/// Scripted stand-in for the remote model
///
/// Replies are consumed in order; once the script runs out every request
/// gets an empty reply.
pub struct FakeInferenceClient {
    credential: bool,
    replies: Mutex<VecDeque<Result<InferenceResponse, InferenceError>>>,
    requests: Mutex<Vec<InferenceRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeInferenceClient {
    pub fn new() -> Self {
        Self {
            credential: true,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::new()
        }
    }

    /// Hold every request until the gate is notified
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn reply_json(self, value: Value) -> Self {
        self.reply(Ok(InferenceResponse::from_text(value.to_string())))
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.reply(Ok(InferenceResponse::from_text(text)))
    }

    pub fn reply_image(self, mime_type: &str, data: &str) -> Self {
        self.reply(Ok(InferenceResponse {
            parts: vec![
                Part::Text("Here is the edited room".to_string()),
                Part::InlineData {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                },
            ],
        }))
    }

    pub fn reply_error(self, error: InferenceError) -> Self {
        self.reply(Err(error))
    }

    fn reply(self, reply: Result<InferenceResponse, InferenceError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl InferenceClient for FakeInferenceClient {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        if !self.credential {
            return Err(InferenceError::MissingCredential);
        }
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(InferenceResponse::default()))
    }
}

/// Router and a handle on its state
pub fn test_app(fake: Arc<FakeInferenceClient>) -> (Router, AppState) {
    let state = AppState::new(fake, ChartOptions::default());
    (build_router(state.clone()), state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 1990-06-15 14:30, Beijing, male, solar calendar
pub fn reference_birth() -> Value {
    serde_json::json!({
        "birthDate": "1990-06-15",
        "birthTime": "14:30",
        "timeUnknown": false,
        "location": {"province": "北京", "city": "北京", "district": "朝阳"},
        "calendarType": "Solar",
        "gender": "Male"
    })
}
