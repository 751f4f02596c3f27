//! # S4 Benchmarks
//!
//! Benchmark bodies, registered from `benches/s4_benchmarks.rs`.

pub mod s4_storage;
