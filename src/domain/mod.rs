//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `plan` - Slide and presentation plan schema with validating constructors
//! - `analysis` - Facts extracted from the source document
//! - `workflow` - Run state, review gate and workflow errors
//! - `prompts` - Model prompt templates and the reviewer message
//! - `extraction` - JSON extraction from model responses

pub mod analysis;
pub mod extraction;
pub mod foundation;
pub mod plan;
pub mod prompts;
pub mod workflow;
