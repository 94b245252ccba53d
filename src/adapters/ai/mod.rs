//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for tests and offline runs
//! - `OpenAIProvider` - OpenAI chat completions, including Azure OpenAI deployments
//!
//! `provider_from_config` picks one from [`AiConfig`].

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIEndpoint, OpenAIProvider, DEFAULT_BASE_URL};

use std::sync::Arc;

use crate::config::{AiConfig, AiProviderKind, ConfigError};
use crate::ports::AIProvider;

/// Builds the provider selected by configuration.
///
/// The configuration is validated first, so a missing key or endpoint is
/// reported as a validation failure rather than a failed request later.
pub fn provider_from_config(config: &AiConfig) -> Result<Arc<dyn AIProvider>, ConfigError> {
    config.validate()?;

    let api_key = config.api_key.clone().unwrap_or_default();
    let openai_config = match config.provider {
        AiProviderKind::Mock => return Ok(Arc::new(MockAIProvider::canned())),
        AiProviderKind::OpenAI => {
            let openai = OpenAIConfig::openai(api_key).with_model(&config.model);
            match &config.base_url {
                Some(url) => openai.with_base_url(url),
                None => openai,
            }
        }
        AiProviderKind::AzureOpenAI => OpenAIConfig::azure(
            api_key,
            config.azure_endpoint.clone().unwrap_or_default(),
            &config.model,
        )
        .with_api_version(&config.api_version),
    };

    let provider = OpenAIProvider::new(
        openai_config
            .with_timeout(config.timeout())
            .with_max_retries(config.max_retries),
    )
    .map_err(|e| ConfigError::ProviderInit(e.to_string()))?;

    Ok(Arc::new(provider))
}
