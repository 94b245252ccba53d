//! Run handlers.
//!
//! Commands:
//! - `StartRunHandler` - analyze a document and suspend at the review gate
//! - `SubmitReviewHandler` - approve, reject or send feedback
//! - `RetryRunHandler` - re-drive a run halted by a failed model step
//!
//! Queries:
//! - `GetRunHandler` - read model of one run
//! - `ListRunsHandler` - summaries of all stored runs

mod driver;
mod get_run;
mod retry_run;
mod start_run;
mod submit_review;

pub use driver::{ReviewHandle, RunOutcome, WorkflowDriver};
pub use get_run::{GetRunHandler, GetRunQuery, ListRunsHandler, RunView};
pub use retry_run::{RetryRunCommand, RetryRunHandler};
pub use start_run::{StartRunCommand, StartRunHandler};
pub use submit_review::{SubmitReviewCommand, SubmitReviewHandler};
