//! Prompt templates and placeholder rendering

pub mod set;
pub mod template;

pub use set::{PromptSet, REQUIRED_KEYS, canonical_key};
pub use template::{Placeholder, PromptContext, unrendered_placeholders};
