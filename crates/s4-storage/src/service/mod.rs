//! Storage engines implementing [`crate::ports::inbound::S4Storage`].

pub mod lifecycle;
mod memory;
mod persistent;


pub use lifecycle::{Lifecycle, LifecycleState};
pub use memory::InMemoryS4Storage;
pub use persistent::PersistentS4Storage;
