//! Grounded prompt construction for the Retention Copilot.
//!
//! This crate assembles the single prompt sent for answer generation:
//! - Fixed role statement and grounding instructions
//! - Exactly the evidence gathered for the question
//! - The verbatim user question
//!
//! It also exposes the required answer headers so callers can check the
//! shape of a generated answer.

pub mod builder;
pub mod template;
pub mod types;

// Re-export main types
pub use builder::{build_grounded_prompt, build_prompt, missing_sections};
pub use template::{INSTRUCTIONS, REQUIRED_SECTIONS, SYSTEM_ROLE};
pub use types::{BuiltPrompt, BuiltPromptMetadata, Evidence};
