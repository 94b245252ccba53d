//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `steps` holds the model-calling steps; `handlers` drives runs through them
//! and persists every change.

pub mod handlers;
pub mod steps;

pub use handlers::{
    GetRunHandler, GetRunQuery, ListRunsHandler, RetryRunCommand, RetryRunHandler,
    ReviewHandle, RunOutcome, RunView, StartRunCommand, StartRunHandler, SubmitReviewCommand,
    SubmitReviewHandler, WorkflowDriver,
};
