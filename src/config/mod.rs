//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `DECK_PLANNER` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use deck_planner::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Model: {}", config.ai.model);
//! ```

mod ai;
mod error;
mod storage;
mod workflow;

pub use ai::{AiConfig, AiProviderKind};
pub use error::{ConfigError, ValidationError};
pub use storage::{StorageBackend, StorageConfig};
pub use workflow::WorkflowConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model provider configuration (OpenAI / Azure OpenAI / mock)
    #[serde(default)]
    pub ai: AiConfig,

    /// Review loop limits and token budgets
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Run state persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present
    /// 2. Reads environment variables with `DECK_PLANNER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DECK_PLANNER__AI__MODEL=gpt-4o` -> `ai.model = "gpt-4o"`
    /// - `DECK_PLANNER__WORKFLOW__MAX_REVISIONS=5` -> `workflow.max_revisions = Some(5)`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DECK_PLANNER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.workflow.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DECK_PLANNER__AI__PROVIDER",
        "DECK_PLANNER__AI__API_KEY",
        "DECK_PLANNER__AI__MODEL",
        "DECK_PLANNER__WORKFLOW__MAX_REVISIONS",
        "DECK_PLANNER__STORAGE__BACKEND",
        "DECK_PLANNER__STORAGE__DATA_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.ai.provider, AiProviderKind::OpenAI);
        assert_eq!(config.workflow.max_revisions, None);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DECK_PLANNER__AI__PROVIDER", "mock");
        env::set_var("DECK_PLANNER__AI__MODEL", "gpt-4o-mini");
        env::set_var("DECK_PLANNER__WORKFLOW__MAX_REVISIONS", "3");
        env::set_var("DECK_PLANNER__STORAGE__BACKEND", "memory");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProviderKind::Mock);
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.workflow.max_revisions, Some(3));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("DECK_PLANNER__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }
}
