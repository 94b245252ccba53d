//! Prompts module - Model prompts and reviewer-facing text.

mod review;
mod templates;

pub use review::review_message;
pub use templates::{
    analysis_prompt, generation_prompt, revision_prompt, ANALYST_SYSTEM_PROMPT,
    DESIGNER_SYSTEM_PROMPT, REVISER_SYSTEM_PROMPT, SLIDE_TYPES_DESCRIPTION,
};
