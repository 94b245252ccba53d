//! PlanGenerator - drafts and revises presentation plans.

use std::sync::Arc;

use super::{call_for_json, metadata};
use crate::domain::analysis::DocumentAnalysis;
use crate::domain::extraction::ResponseExtractor;
use crate::domain::foundation::RunId;
use crate::domain::plan::PresentationPlan;
use crate::domain::prompts::{
    generation_prompt, revision_prompt, DESIGNER_SYSTEM_PROMPT, REVISER_SYSTEM_PROMPT,
};
use crate::domain::workflow::{WorkflowError, WorkflowStep};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, ResponseFormat};

/// Schema name sent with generation and revision requests.
pub const PLAN_SCHEMA: &str = "presentation_plan";

/// What a revision starts from.
#[derive(Debug, Clone, Copy)]
pub struct Revision<'a> {
    pub current_plan: &'a PresentationPlan,
    pub feedback: &'a str,
}

/// Produces a [`PresentationPlan`] with one model call per invocation.
pub struct PlanGenerator {
    provider: Arc<dyn AIProvider>,
    extractor: ResponseExtractor,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl PlanGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            extractor: ResponseExtractor::new(),
            max_tokens: 4000,
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

    /// Drafts a plan, or revises one when `revision` is given.
    ///
    /// `source_document` is stamped on plans that don't name their source.
    pub async fn generate(
        &self,
        run_id: RunId,
        analysis: &DocumentAnalysis,
        document: &str,
        revision: Option<Revision<'_>>,
        source_document: Option<&str>,
    ) -> Result<PresentationPlan, WorkflowError> {
        let (step, system_prompt, prompt) = match revision {
            Some(rev) => {
                if rev.feedback.trim().is_empty() {
                    return Err(WorkflowError::invalid_input(
                        "feedback",
                        "feedback must not be empty",
                    ));
                }
                (
                    WorkflowStep::Revise,
                    REVISER_SYSTEM_PROMPT,
                    revision_prompt(rev.current_plan, analysis, rev.feedback, document),
                )
            }
            None => (
                WorkflowStep::Generate,
                DESIGNER_SYSTEM_PROMPT,
                generation_prompt(analysis, document),
            ),
        };

        let mut request = CompletionRequest::new(metadata(run_id, step))
            .with_system_prompt(system_prompt)
            .with_message(MessageRole::User, prompt)
            .with_max_tokens(self.max_tokens)
            .with_response_format(ResponseFormat::json(PLAN_SCHEMA));
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let value = call_for_json(self.provider.as_ref(), &self.extractor, step, request).await?;

        let mut plan = PresentationPlan::from_value(&value)
            .map_err(|e| WorkflowError::schema_validation(step, e.to_string()))?;
        if plan.source_document().is_none() {
            if let Some(source) = source_document {
                plan = plan.with_source_document(source);
            }
        }

        if let Some(rev) = revision {
            if &plan == rev.current_plan {
                tracing::warn!(run_id = %run_id, "Revised plan is identical to the previous one");
            }
        }

        tracing::info!(
            run_id = %run_id,
            step = %step,
            title = %plan.title(),
            slides = plan.slide_count(),
            "Plan generated"
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::plan::SlideKind;
    use serde_json::json;

    fn plan_json(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "slides": [
                { "slide_type": "title", "title": title },
                { "slide_type": "key_points", "title": "Costs", "points": [
                    { "heading": "Budget", "description": "$50k over 3 months" }
                ]}
            ]
        })
    }

    fn generator(provider: &MockAIProvider) -> PlanGenerator {
        PlanGenerator::new(Arc::new(provider.clone()))
    }

    #[tokio::test]
    async fn generates_plan_from_analysis() {
        let provider = MockAIProvider::new().with_json(plan_json("Project X"));
        let analysis = DocumentAnalysis::new("Project X");

        let plan = generator(&provider)
            .generate(RunId::new(), &analysis, "doc", None, Some("x.md"))
            .await
            .unwrap();

        assert_eq!(plan.kinds(), vec![SlideKind::Title, SlideKind::KeyPoints]);
        assert_eq!(plan.source_document(), Some("x.md"));

        let call = provider.last_call().unwrap();
        assert_eq!(call.metadata.step, "generate");
        assert_eq!(call.system_prompt.as_deref(), Some(DESIGNER_SYSTEM_PROMPT));
        assert!(call.last_user_message().unwrap().contains("Project X"));
    }

    #[tokio::test]
    async fn revision_prompt_carries_feedback_and_prior_plan() {
        let provider = MockAIProvider::new().with_json(plan_json("Project X v2"));
        let mut analysis = DocumentAnalysis::new("Project X");
        analysis.timeline = "3 months".to_string();
        let current = PresentationPlan::from_value(&plan_json("Project X")).unwrap();

        let plan = generator(&provider)
            .generate(
                RunId::new(),
                &analysis,
                "doc",
                Some(Revision {
                    current_plan: &current,
                    feedback: "add a slide about risks",
                }),
                None,
            )
            .await
            .unwrap();

        assert_eq!(plan.title(), "Project X v2");
        let call = provider.last_call().unwrap();
        assert_eq!(call.metadata.step, "revise");
        let prompt = call.last_user_message().unwrap();
        assert!(prompt.contains("add a slide about risks"));
        assert!(prompt.contains("\"Project X\""));
        assert!(prompt.contains("\"timeline\": \"3 months\""));
    }

    #[tokio::test]
    async fn blank_feedback_is_invalid_input() {
        let provider = MockAIProvider::new();
        let current = PresentationPlan::from_value(&plan_json("Project X")).unwrap();

        let err = generator(&provider)
            .generate(
                RunId::new(),
                &DocumentAnalysis::new("Project X"),
                "doc",
                Some(Revision {
                    current_plan: &current,
                    feedback: " ",
                }),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidInput { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_slide_type_is_schema_violation() {
        let provider = MockAIProvider::new().with_json(json!({
            "title": "Deck",
            "slides": [{ "slide_type": "chart", "title": "Numbers" }]
        }));

        let err = generator(&provider)
            .generate(RunId::new(), &DocumentAnalysis::new("X"), "doc", None, None)
            .await
            .unwrap_err();

        match err {
            WorkflowError::SchemaValidation { step, reason } => {
                assert_eq!(step, WorkflowStep::Generate);
                assert!(reason.contains("slides[0]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_slide_list_is_schema_violation() {
        let provider = MockAIProvider::new().with_json(json!({ "title": "Deck", "slides": [] }));

        let err = generator(&provider)
            .generate(RunId::new(), &DocumentAnalysis::new("X"), "doc", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::SchemaValidation { .. }));
    }
}
