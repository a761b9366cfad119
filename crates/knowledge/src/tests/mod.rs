//! Crate-level ranking tests.
