//! # S4 Test Suite
//!
//! Cross-crate test crate:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmark bodies
//! │   └── s4_storage.rs
//! │
//! └── integration/      # Storage engines wired to the real secp256k1 envelope
//!     ├── signed_storage.rs
//!     └── lifecycle.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p s4-tests
//! cargo test -p s4-tests integration::
//!
//! # Benchmarks
//! cargo bench -p s4-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
