//! Review loop configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Workflow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum feedback cycles per run; unlimited when unset
    pub max_revisions: Option<u32>,

    /// Token budget for the analysis call
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,

    /// Token budget for plan generation and revision calls
    #[serde(default = "default_plan_max_tokens")]
    pub plan_max_tokens: u32,
}

impl WorkflowConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_revisions == Some(0) {
            return Err(ValidationError::InvalidRevisionLimit);
        }
        if self.analysis_max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens("analysis_max_tokens"));
        }
        if self.plan_max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens("plan_max_tokens"));
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_revisions: None,
            analysis_max_tokens: default_analysis_max_tokens(),
            plan_max_tokens: default_plan_max_tokens(),
        }
    }
}

fn default_analysis_max_tokens() -> u32 {
    2000
}

fn default_plan_max_tokens() -> u32 {
    4000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded() {
        let config = WorkflowConfig::default();
        assert_eq!(config.max_revisions, None);
        assert_eq!(config.plan_max_tokens, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_revision_limit_is_rejected() {
        let config = WorkflowConfig {
            max_revisions: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRevisionLimit));
    }
}
