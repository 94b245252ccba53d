//! Analysis module - Facts extracted from the source document.

mod document_analysis;

pub use document_analysis::{DocumentAnalysis, DEFAULT_TONE};
