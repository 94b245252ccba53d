//! Model-calling workflow steps.
//!
//! Each step renders its prompt, makes exactly one call through the
//! [`AIProvider`](crate::ports::AIProvider) port and validates the answer.
//! Neither step touches persistence; the handlers own the state record.

mod analyzer;
mod generator;

pub use analyzer::{DocumentAnalyzer, ANALYSIS_SCHEMA};
pub use generator::{PlanGenerator, Revision, PLAN_SCHEMA};

use serde_json::Value;
use tracing::Instrument;

use crate::domain::extraction::ResponseExtractor;
use crate::domain::foundation::RunId;
use crate::domain::workflow::{WorkflowError, WorkflowStep};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

/// Builds request metadata with a fresh trace id.
fn metadata(run_id: RunId, step: WorkflowStep) -> RequestMetadata {
    RequestMetadata::new(run_id, step.as_str(), uuid::Uuid::new_v4().to_string())
}

/// Runs one model call and extracts the JSON object from its answer.
async fn call_for_json(
    provider: &dyn AIProvider,
    extractor: &ResponseExtractor,
    step: WorkflowStep,
    request: CompletionRequest,
) -> Result<Value, WorkflowError> {
    let span = tracing::info_span!(
        "model_call",
        run_id = %request.metadata.run_id,
        step = %step,
        trace_id = %request.metadata.trace_id,
    );

    let response = provider
        .complete(request)
        .instrument(span)
        .await
        .map_err(|e| WorkflowError::model_invocation(step, e))?;

    tracing::debug!(
        step = %step,
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        "Model call completed"
    );

    extractor
        .extract(&response.content)
        .map_err(|e| WorkflowError::schema_validation(step, e.to_string()))
}
