//! Storage adapters for workflow runs.
//!
//! - `FileRunStore` - YAML state and JSON plans on disk
//! - `InMemoryRunStore` - process-local maps, for tests and ephemeral use

mod file_run_store;
mod in_memory_run_store;

pub use file_run_store::FileRunStore;
pub use in_memory_run_store::InMemoryRunStore;
