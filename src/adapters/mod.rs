//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - model providers (OpenAI, Azure OpenAI, mock)
//! - `storage` - run stores (files on disk, in-memory)

pub mod ai;
pub mod storage;

pub use ai::{provider_from_config, MockAIProvider, OpenAIProvider};
pub use storage::{FileRunStore, InMemoryRunStore};
