//! DocumentAnalyzer - extracts the facts a presentation is built from.

use std::sync::Arc;

use super::{call_for_json, metadata};
use crate::domain::analysis::DocumentAnalysis;
use crate::domain::extraction::ResponseExtractor;
use crate::domain::foundation::RunId;
use crate::domain::prompts::{analysis_prompt, ANALYST_SYSTEM_PROMPT};
use crate::domain::workflow::{WorkflowError, WorkflowStep};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, ResponseFormat};

/// Schema name sent with the analysis request.
pub const ANALYSIS_SCHEMA: &str = "document_analysis";

/// Turns raw document text into a [`DocumentAnalysis`] with one model call.
pub struct DocumentAnalyzer {
    provider: Arc<dyn AIProvider>,
    extractor: ResponseExtractor,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl DocumentAnalyzer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            extractor: ResponseExtractor::new(),
            max_tokens: 2000,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Analyzes `document`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank document
    /// - `ModelInvocation` when the provider call fails
    /// - `SchemaValidation` when the answer is not a valid analysis object
    pub async fn analyze(
        &self,
        run_id: RunId,
        document: &str,
    ) -> Result<DocumentAnalysis, WorkflowError> {
        if document.trim().is_empty() {
            return Err(WorkflowError::invalid_input(
                "document",
                "document text must not be empty",
            ));
        }

        let mut request = CompletionRequest::new(metadata(run_id, WorkflowStep::Analyze))
            .with_system_prompt(ANALYST_SYSTEM_PROMPT)
            .with_message(MessageRole::User, analysis_prompt(document))
            .with_max_tokens(self.max_tokens)
            .with_response_format(ResponseFormat::json(ANALYSIS_SCHEMA));
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let value = call_for_json(
            self.provider.as_ref(),
            &self.extractor,
            WorkflowStep::Analyze,
            request,
        )
        .await?;

        let analysis = DocumentAnalysis::from_value(&value)
            .map_err(|e| WorkflowError::schema_validation(WorkflowStep::Analyze, e.to_string()))?;

        tracing::info!(
            run_id = %run_id,
            main_topic = %analysis.main_topic,
            sections = analysis.key_sections.len(),
            "Document analyzed"
        );

        Ok(analysis)
    }
}
