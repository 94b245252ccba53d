//! Plan module - The presentation plan schema.
//!
//! A plan is an ordered list of typed slides plus deck metadata. Model output
//! only becomes a plan through the validating constructors in `validation`.

mod presentation_plan;
mod render;
mod slide;
mod validation;

pub use presentation_plan::{PresentationPlan, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
pub use slide::{KeyPoint, Slide, SlideKind};
pub use validation::SchemaViolation;

pub(crate) use validation::{
    expect_object, optional_string, optional_string_list, reject_unknown_keys, required_string,
};
