//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod run;

pub use run::{
    GetRunHandler, GetRunQuery, ListRunsHandler, RetryRunCommand, RetryRunHandler,
    ReviewHandle, RunOutcome, RunView, StartRunCommand, StartRunHandler, SubmitReviewCommand,
    SubmitReviewHandler, WorkflowDriver,
};
