//! Opaque signal handles.

use serde::{Deserialize, Serialize};

/// Opaque ID for one signal exposed by a circuit evaluator.
///
/// Handles are dense indices in the order the evaluator declares its
/// signals. They are cheap to copy and are what agents and processes hold
/// instead of references into evaluator memory.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the raw index as a `usize`, for table lookups.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
