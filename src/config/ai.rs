//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider answers model calls
    #[serde(default)]
    pub provider: AiProviderKind,

    /// API key for OpenAI or Azure OpenAI
    pub api_key: Option<String>,

    /// Model name (the deployment name for Azure)
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for OpenAI-compatible servers
    pub base_url: Option<String>,

    /// Azure resource endpoint, e.g. https://acme.openai.azure.com
    pub azure_endpoint: Option<String>,

    /// Azure API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum AiProviderKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "azure_openai")]
    AzureOpenAI,
    /// Offline provider with canned answers
    #[serde(rename = "mock")]
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }

        match self.provider {
            AiProviderKind::Mock => {}
            AiProviderKind::OpenAI if !self.has_api_key() => {
                return Err(ValidationError::MissingRequired("AI__API_KEY"));
            }
            AiProviderKind::AzureOpenAI => {
                if !self.has_api_key() {
                    return Err(ValidationError::MissingRequired("AI__API_KEY"));
                }
                match self.azure_endpoint.as_deref() {
                    None | Some("") => {
                        return Err(ValidationError::MissingRequired("AI__AZURE_ENDPOINT"));
                    }
                    Some(endpoint) if !endpoint.starts_with("https://") => {
                        return Err(ValidationError::InvalidAzureEndpoint);
                    }
                    Some(_) => {}
                }
            }
            AiProviderKind::OpenAI => {}
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::default(),
            api_key: None,
            model: default_model(),
            base_url: None,
            azure_endpoint: None,
            api_version: default_api_version(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_version() -> String {
    "2024-08-01-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}
