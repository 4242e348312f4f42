//! Phases of one simulation instant and the barriers that gate them.
//!
//! Within an instant the kernel walks through four phases in a fixed order:
//! testbench writes ([`Phase::WriteOnly`]), post-evaluation reads
//! ([`Phase::ReadOnly`]), combinational settle ([`Phase::CombStable`]) and
//! sequential settle ([`Phase::AllStable`]). Each phase has at most one
//! pending barrier; processes that wait on a phase join that barrier and are
//! released together when it fires.

use std::fmt;

use serde::{Deserialize, Serialize};

use lockstep_common::SimTime;

use crate::error::SimError;

/// Calendar ordering among entries due at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Internal stop sentinel; runs before anything else at its instant.
    Urgent = 0,
    /// Testbench writes and timer wake-ups.
    WriteOnly = 1,
    /// Reads after the circuit has evaluated the latest writes.
    ReadOnly = 2,
    /// Combinational logic has settled.
    CombStable = 3,
    /// Sequential logic has settled; last chance to look at this instant.
    AllStable = 4,
}

/// One of the four phases of an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Testbench may write signals.
    WriteOnly,
    /// Testbench may read signals driven by the latest evaluation.
    ReadOnly,
    /// Combinational outputs are final for this instant.
    CombStable,
    /// Registers have been updated for this instant.
    AllStable,
}

impl Phase {
    /// All phases in firing order.
    pub const ALL: [Phase; 4] = [
        Phase::WriteOnly,
        Phase::ReadOnly,
        Phase::CombStable,
        Phase::AllStable,
    ];

    /// Returns the calendar priority of this phase's barrier.
    pub fn priority(self) -> Priority {
        match self {
            Phase::WriteOnly => Priority::WriteOnly,
            Phase::ReadOnly => Priority::ReadOnly,
            Phase::CombStable => Priority::CombStable,
            Phase::AllStable => Priority::AllStable,
        }
    }

    fn slot(self) -> usize {
        match self {
            Phase::WriteOnly => 0,
            Phase::ReadOnly => 1,
            Phase::CombStable => 2,
            Phase::AllStable => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Whether the testbench may currently write or read circuit signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Writes are accepted, reads are rejected.
    WriteOnly,
    /// Reads are accepted, writes are rejected.
    ReadOnly,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::WriteOnly => write!(f, "write-only"),
            AccessMode::ReadOnly => write!(f, "read-only"),
        }
    }
}

/// Per-phase barrier slots for the current instant.
///
/// A slot is `None` until the first process (or the kernel itself) asks for
/// that phase; at that moment the caller must schedule the barrier on the
/// calendar exactly once. Firing a barrier empties its slot.
#[derive(Debug)]
pub struct PhaseBarriers<W> {
    slots: [Option<Vec<W>>; 4],
    settled: bool,
}

impl<W> PhaseBarriers<W> {
    /// Creates an empty set of barriers.
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
            settled: false,
        }
    }

    /// Returns `true` if a barrier for `phase` is scheduled and not yet fired.
    pub fn is_pending(&self, phase: Phase) -> bool {
        self.slots[phase.slot()].is_some()
    }

    /// Ensures a barrier for `phase` exists.
    ///
    /// Returns `true` if the barrier was created by this call, in which case
    /// the caller schedules it.
    pub fn spot(&mut self, phase: Phase) -> bool {
        let slot = &mut self.slots[phase.slot()];
        if slot.is_some() {
            false
        } else {
            *slot = Some(Vec::new());
            true
        }
    }

    /// Registers `waiter` on the barrier for `phase`, creating it if needed.
    ///
    /// Returns `true` if the barrier was created by this call.
    pub fn join(&mut self, phase: Phase, waiter: W) -> bool {
        let created = self.spot(phase);
        if let Some(waiters) = self.slots[phase.slot()].as_mut() {
            waiters.push(waiter);
        }
        created
    }

    /// Removes the barrier for `phase`, returning its waiters in
    /// registration order.
    pub fn fire(&mut self, phase: Phase, time: SimTime) -> Result<Vec<W>, SimError> {
        self.slots[phase.slot()]
            .take()
            .ok_or_else(|| SimError::SchedulingInvariant {
                time,
                reason: format!("{phase} barrier fired without being scheduled"),
            })
    }

    /// Rejects requests for phases the instant has already passed.
    ///
    /// Once combinational logic has settled only [`Phase::AllStable`] may be
    /// requested until time advances.
    pub fn check_request(&self, phase: Phase, time: SimTime) -> Result<(), SimError> {
        if self.settled && phase != Phase::AllStable {
            return Err(SimError::PhaseOrder {
                time,
                requested: phase,
            });
        }
        Ok(())
    }

    /// Returns `true` once combinational logic has settled at this instant.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Marks whether combinational logic has settled at this instant.
    pub fn set_settled(&mut self, settled: bool) {
        self.settled = settled;
    }
}

impl<W> Default for PhaseBarriers<W> {
    fn default() -> Self {
        Self::new()
    }
}
