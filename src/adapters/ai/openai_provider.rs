//! OpenAI Provider - Implementation of AIProvider for the chat completions API.
//!
//! Talks to either api.openai.com (or any compatible base URL) or an Azure
//! OpenAI deployment. Requests that expect JSON are sent with
//! `response_format: {"type": "json_object"}`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::openai(api_key).with_model("gpt-4o");
//! let azure = OpenAIConfig::azure(api_key, "https://acme.openai.azure.com", "gpt-4o")
//!     .with_api_version("2024-08-01-preview");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Retries
//!
//! Transient failures (rate limits, 5xx, network errors, timeouts) are retried
//! with exponential backoff up to `max_retries` times.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Default OpenAI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Where requests are sent and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAIEndpoint {
    /// OpenAI or a compatible server; bearer token auth.
    OpenAI { base_url: String },
    /// Azure OpenAI deployment; `api-key` header auth.
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (for Azure this is reported only; the deployment picks the model).
    pub model: String,
    pub endpoint: OpenAIEndpoint,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub backoff_base: Duration,
}

impl OpenAIConfig {
    /// Creates a configuration for api.openai.com.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o".to_string(),
            endpoint: OpenAIEndpoint::OpenAI {
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            timeout: Duration::from_secs(120),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Creates a configuration for an Azure OpenAI deployment.
    pub fn azure(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        let deployment = deployment.into();
        Self {
            model: deployment.clone(),
            endpoint: OpenAIEndpoint::Azure {
                endpoint: endpoint.into(),
                deployment,
                api_version: "2024-08-01-preview".to_string(),
            },
            ..Self::openai(api_key)
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL (OpenAI endpoints only).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        if let OpenAIEndpoint::OpenAI { base_url } = &mut self.endpoint {
            *base_url = url.into();
        }
        self
    }

    /// Sets the API version (Azure endpoints only).
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        if let OpenAIEndpoint::Azure { api_version, .. } = &mut self.endpoint {
            *api_version = version.into();
        }
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the first backoff delay.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI / Azure OpenAI provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::invalid_request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        match &self.config.endpoint {
            OpenAIEndpoint::OpenAI { base_url } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            OpenAIEndpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.endpoint {
            OpenAIEndpoint::OpenAI { .. } => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key()))
            }
            OpenAIEndpoint::Azure { .. } => builder.header("api-key", self.config.api_key()),
        }
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        OpenAIRequest {
            model: match self.config.endpoint {
                OpenAIEndpoint::OpenAI { .. } => Some(self.config.model.clone()),
                OpenAIEndpoint::Azure { .. } => None,
            },
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .response_format
                .is_json()
                .then(|| OpenAIResponseFormat {
                    kind: "json_object".to_string(),
                }),
        }
    }

    /// Sends a request once.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        self.authorize(self.client.post(self.completions_url()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(Self::error_for_status(status.as_u16(), error_body))
    }

    /// Maps a non-success HTTP status to an error.
    fn error_for_status(status: u16, error_body: String) -> AIError {
        match status {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(Self::parse_retry_after(&error_body)),
            400 if error_body.contains("content_filter") => AIError::content_filtered(error_body),
            400 if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded") =>
            {
                AIError::context_too_long(error_body)
            }
            400 | 404 | 422 => AIError::InvalidRequest(error_body),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        // OpenAI includes the wait in the message text; default to 30 seconds
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(s) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = s.find("try again in ") {
                    let rest = &s[idx + 13..];
                    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if let Ok(secs) = digits.parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
        30
    }

    /// Parses a successful response body.
    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Self::into_completion(openai_response)
    }

    fn into_completion(openai_response: OpenAIResponse) -> Result<CompletionResponse, AIError> {
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        if finish_reason == FinishReason::ContentFilter {
            return Err(AIError::content_filtered("completion stopped by content filter"));
        }

        let usage = openai_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: openai_response.model,
            finish_reason,
        })
    }

    /// Backoff before retry `attempt` (0-based): base, 2x base, 4x base, ...
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config.backoff_base * 2u32.saturating_pow(attempt)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(completion) => return Ok(completion),
                Err(err) if !err.is_retryable() || retry_count >= self.config.max_retries => {
                    return Err(err)
                }
                Err(err) => {
                    let delay = self.backoff_delay(retry_count);
                    tracing::warn!(
                        run_id = %request.metadata.run_id,
                        step = %request.metadata.step,
                        attempt = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying model call after transient failure"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        let max_context = match self.config.model.as_str() {
            m if m.starts_with("gpt-4o") || m.starts_with("gpt-4-turbo") => 128_000,
            m if m.starts_with("gpt-4.1") => 1_000_000,
            m if m.starts_with("gpt-4") => 8_192,
            m if m.starts_with("gpt-3.5") => 16_385,
            _ => 128_000,
        };

        let name = match self.config.endpoint {
            OpenAIEndpoint::OpenAI { .. } => "openai",
            OpenAIEndpoint::Azure { .. } => "azure_openai",
        };

        ProviderInfo::new(name, &self.config.model, max_context).with_json_mode(true)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat>,
}

#[derive(Debug, Serialize)]
struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RunId;
    use crate::ports::{RequestMetadata, ResponseFormat};

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(RunId::new(), "generate", "trace-1"))
            .with_system_prompt("You are an expert presentation designer.")
            .with_message(MessageRole::User, "Create a plan")
            .with_max_tokens(4000)
            .with_temperature(0.7)
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::openai("test-key")
            .with_model("gpt-4o-mini")
            .with_base_url("https://custom.api.com/v1/")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5);

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn openai_url_uses_base_url() {
        let provider =
            OpenAIProvider::new(OpenAIConfig::openai("k").with_base_url("http://localhost:8080/v1/"))
                .unwrap();
        assert_eq!(provider.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn azure_url_includes_deployment_and_api_version() {
        let config = OpenAIConfig::azure("k", "https://acme.openai.azure.com/", "gpt-4o-prod")
            .with_api_version("2024-06-01");
        let provider = OpenAIProvider::new(config).unwrap();

        assert_eq!(
            provider.completions_url(),
            "https://acme.openai.azure.com/openai/deployments/gpt-4o-prod/chat/completions?api-version=2024-06-01"
        );
        assert_eq!(provider.provider_info().name, "azure_openai");
    }

    #[test]
    fn request_body_includes_system_prompt_and_json_mode() {
        let provider = OpenAIProvider::new(OpenAIConfig::openai("k")).unwrap();
        let body = provider.to_openai_request(
            &request().with_response_format(ResponseFormat::json("presentation_plan")),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Create a plan");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["max_tokens"], 4000);
    }

    #[test]
    fn text_requests_omit_response_format() {
        let provider = OpenAIProvider::new(OpenAIConfig::openai("k")).unwrap();
        let json = serde_json::to_value(provider.to_openai_request(&request())).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn azure_request_body_omits_model() {
        let provider = OpenAIProvider::new(OpenAIConfig::azure("k", "https://x", "dep")).unwrap();
        let json = serde_json::to_value(provider.to_openai_request(&request())).unwrap();
        assert!(json.get("model").is_none());
    }

    #[test]
    fn status_codes_map_to_errors() {
        assert!(matches!(
            OpenAIProvider::error_for_status(401, String::new()),
            AIError::AuthenticationFailed
        ));
        assert!(matches!(
            OpenAIProvider::error_for_status(429, String::new()),
            AIError::RateLimited { retry_after_secs: 30 }
        ));
        assert!(matches!(
            OpenAIProvider::error_for_status(400, r#"{"error":{"code":"content_filter"}}"#.into()),
            AIError::ContentFiltered { .. }
        ));
        assert!(matches!(
            OpenAIProvider::error_for_status(400, "context_length_exceeded".into()),
            AIError::ContextTooLong { .. }
        ));
        assert!(OpenAIProvider::error_for_status(503, "busy".into()).is_retryable());
        assert!(!OpenAIProvider::error_for_status(400, "bad".into()).is_retryable());
    }

    #[test]
    fn parses_completion_body() {
        let body: OpenAIResponse = serde_json::from_str(
            r#"{"model":"gpt-4o-2024-08-06","choices":[{"message":{"role":"assistant","content":"{\"a\":1}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":12,"completion_tokens":8}}"#,
        )
        .unwrap();
        let completion = OpenAIProvider::into_completion(body).unwrap();

        assert_eq!(completion.content, "{\"a\":1}");
        assert_eq!(completion.usage.total_tokens, 20);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn filtered_completion_is_an_error() {
        let body: OpenAIResponse = serde_json::from_str(
            r#"{"model":"gpt-4o","choices":[{"message":{"content":null},"finish_reason":"content_filter"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            OpenAIProvider::into_completion(body),
            Err(AIError::ContentFiltered { .. })
        ));
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let body: OpenAIResponse = serde_json::from_str(r#"{"model":"m","choices":[]}"#).unwrap();
        assert!(matches!(OpenAIProvider::into_completion(body), Err(AIError::Parse(_))));
    }

    #[test]
    fn backoff_doubles() {
        let provider = OpenAIProvider::new(
            OpenAIConfig::openai("k").with_backoff_base(Duration::from_millis(100)),
        )
        .unwrap();
        assert_eq!(provider.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(provider.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(provider.backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 20s."}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 20);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Something went wrong"}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 30);
    }
}
