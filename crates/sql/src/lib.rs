//! Structured-data evidence for the copilot.
//!
//! Questions are mapped onto a fixed set of read-only templates over the
//! `subscribers` table; nothing from the question except a row limit ever
//! reaches the SQL text.

pub mod gatherer;
pub mod guard;
pub mod query;
pub mod seed;
pub mod store;

pub use gatherer::{SqlEvidence, SqlGatherer, NO_RESULTS_MESSAGE};
pub use guard::{is_safe, BLOCKED_MESSAGE};
pub use query::{contains_phrase, extract_limit, pick_query, pick_query_with, QueryKind, QueryPlan, DEFAULT_LIMIT};
pub use seed::{generate_rows, seed_database, SeedReport, DEFAULT_SEED};
pub use store::{QueryTable, SqliteStore, SubscriberStore};
