//! # Ports Layer
//!
//! Defines the port traits for the S4 storage engine.
//!
//! - `inbound.rs` - Driving ports (API exposed to job runners and aggregation)
//! - `outbound.rs` - Driven ports (dependencies the engine requires)

pub mod inbound;
pub mod outbound;
