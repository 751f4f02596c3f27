//! # Integration Tests
//!
//! Storage engines wired to the production envelope.

pub mod lifecycle;
