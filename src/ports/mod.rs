//! Ports - Interfaces between the workflow and the outside world.
//!
//! - `AIProvider` - the model-call collaborator
//! - `RunStore` - persistence of run state and final plans

mod ai_provider;
mod run_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseFormat, TokenUsage,
};
pub use run_store::{check_version, RunStore, RunStoreError, RunSummary};
