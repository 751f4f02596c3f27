//! # S4 Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | in-memory `put` (5 KiB) | < 10μs |
//! | in-memory `get` hit | < 2μs |
//! | secp256k1 signer recovery | < 1ms |
//! | sweep over 10k entries | < 1ms |

use criterion::{criterion_group, criterion_main};
use s4_tests::benchmarks::s4_storage::register_benchmarks;

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);
