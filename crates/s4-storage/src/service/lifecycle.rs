//! Lifecycle state machine for the in-memory backend.
//!
//! ```text
//! [CREATED] ──start──→ [STARTED] ──close──→ [STOPPED]
//!     │                                         ↑
//!     └────────────────────close────────────────┘
//! ```
//!
//! Transitions are single compare-exchange operations, so concurrent callers
//! agree on exactly one winner.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Created = 0,
    Started = 1,
    Stopped = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Created,
            1 => LifecycleState::Started,
            _ => LifecycleState::Stopped,
        }
    }

    /// Lower-case name for errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Stopped => "stopped",
        }
    }
}

/// Atomic three-state lifecycle.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Created as u8),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Started
    }

    /// Move `Created -> Started`. On failure returns the state actually observed.
    pub fn start(&self) -> Result<(), LifecycleState> {
        self.state
            .compare_exchange(
                LifecycleState::Created as u8,
                LifecycleState::Started as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(LifecycleState::from_u8)
    }

    /// Move to `Stopped` from any state, returning the previous state.
    pub fn stop(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.swap(LifecycleState::Stopped as u8, Ordering::AcqRel))
    }
}
