//! Question answering pipeline for the Retention Copilot.
//!
//! A question is routed to exactly one evidence path (subscriber SQL or
//! knowledge retrieval), the evidence is folded into the grounded prompt, and
//! the answer is generated through a rate-limit-aware client.

pub mod pipeline;
pub mod router;

pub use pipeline::{Copilot, CopilotAnswer, GatheredEvidence};
pub use router::{classification_prompt, parse_label, rule_based, Intent, Router};
