//! Embedding providers for the semantic index.
//!
//! Provides provider-agnostic embedding generation. The same provider must be
//! used for corpus entries and queries, otherwise similarities are meaningless.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
