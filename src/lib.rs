//! Deck Planner - Document to presentation plan assistant
//!
//! This crate turns a proposal document into a structured slide plan with a
//! language model, then cycles the plan through human review until it is
//! approved or rejected.

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
