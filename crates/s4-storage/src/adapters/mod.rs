//! Adapters implementing outbound ports.

pub mod entry_store;

pub use entry_store::InMemoryEntryStore;
