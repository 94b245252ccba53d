//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests and offline runs to go through the whole workflow without
//! calling a real model.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Canned analysis/plan JSON once the queue is empty (`canned()`)
//! - Simulated delays
//! - Error injection for failure and retry paths
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"main_topic": "Project X"}"#)
//!     .with_error(MockError::Network { message: "reset".into() });
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    ResponseFormat, TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Answer JSON requests with canned documents once the queue is empty.
    canned: bool,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128_000).with_json_mode(true),
            delay: Duration::ZERO,
            canned: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock that answers every JSON request with a valid document.
    pub fn canned() -> Self {
        Self {
            canned: true,
            ..Self::new()
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Adds a JSON value as a successful response.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Queues another response on a shared provider.
    pub fn push(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the most recent call.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Gets the next queued response or a fallback.
    fn next_response(&self, request: &CompletionRequest, call_number: usize) -> MockResponse {
        if let Some(queued) = self.responses.lock().unwrap().pop_front() {
            return queued;
        }

        let content = match (&request.response_format, self.canned) {
            (ResponseFormat::Json { schema_name }, true) => canned_json(schema_name, call_number),
            _ => "Mock response".to_string(),
        };
        MockResponse::Success {
            content,
            usage: TokenUsage::new(5, 10),
            finish_reason: FinishReason::Stop,
        }
    }
}

fn canned_json(schema_name: &str, call_number: usize) -> String {
    let value = match schema_name {
        "document_analysis" => json!({
            "main_topic": "Proposal overview",
            "key_entities": [],
            "key_sections": ["Context", "Proposal", "Costs", "Timeline"],
            "technical_highlights": ["Proposed solution"],
            "economic_highlights": ["Budget and expected return"],
            "timeline": "",
            "target_audience": "Decision makers",
            "suggested_tone": "professional"
        }),
        _ => json!({
            "title": format!("Proposal Presentation (draft {})", call_number),
            "description": "Generated offline by the mock provider",
            "target_audience": "Decision makers",
            "estimated_duration_minutes": 20,
            "slides": [
                { "slide_type": "title", "title": "Proposal Presentation", "subtitle": format!("Draft {}", call_number) },
                { "slide_type": "agenda", "items": ["Context", "Proposal", "Costs", "Next steps"] },
                { "slide_type": "content", "title": "Proposal", "body": "What we propose and why." },
                { "slide_type": "key_points", "title": "Costs", "points": [
                    { "heading": "Budget", "description": "Expected investment" }
                ]},
                { "slide_type": "closing", "message": "Approve the proposal" }
            ]
        }),
    };
    value.to_string()
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(&request, call_number) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
