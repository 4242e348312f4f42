//! Wait conditions a process can suspend on.

use lockstep_common::{SignalId, SimTime, Value};

use crate::phase::Phase;

/// Which transitions of a signal wake an edge subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Any change of value.
    Any,
    /// Change to a concrete nonzero value.
    Rising,
    /// Change to a concrete zero value.
    Falling,
}

impl Edge {
    /// Returns `true` if a change to `new` wakes a subscriber on this edge.
    ///
    /// Changes to an undefined value wake only [`Edge::Any`].
    pub fn matches(self, new: Value) -> bool {
        match self {
            Edge::Any => true,
            Edge::Rising => new.to_bool() == Ok(true),
            Edge::Falling => new.to_bool() == Ok(false),
        }
    }
}

/// A condition a suspended process waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The next write phase.
    WriteOnly,
    /// The next read phase.
    ReadOnly,
    /// Combinational logic settled.
    CombStable,
    /// Sequential logic settled.
    AllStable,
    /// A delay in time units from now. `Timer(0)` resumes immediately.
    Timer(SimTime),
    /// The next matching change of a signal.
    Edge(SignalId, Edge),
}

impl Trigger {
    /// Shorthand for [`Trigger::Edge`] with [`Edge::Rising`].
    pub fn rising(signal: SignalId) -> Self {
        Trigger::Edge(signal, Edge::Rising)
    }

    /// Shorthand for [`Trigger::Edge`] with [`Edge::Falling`].
    pub fn falling(signal: SignalId) -> Self {
        Trigger::Edge(signal, Edge::Falling)
    }

    /// Shorthand for [`Trigger::Edge`] with [`Edge::Any`].
    pub fn change(signal: SignalId) -> Self {
        Trigger::Edge(signal, Edge::Any)
    }

    /// Returns the phase this trigger waits for, if it is a phase trigger.
    pub fn phase(self) -> Option<Phase> {
        match self {
            Trigger::WriteOnly => Some(Phase::WriteOnly),
            Trigger::ReadOnly => Some(Phase::ReadOnly),
            Trigger::CombStable => Some(Phase::CombStable),
            Trigger::AllStable => Some(Phase::AllStable),
            Trigger::Timer(_) | Trigger::Edge(..) => None,
        }
    }
}

impl From<Phase> for Trigger {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::WriteOnly => Trigger::WriteOnly,
            Phase::ReadOnly => Trigger::ReadOnly,
            Phase::CombStable => Trigger::CombStable,
            Phase::AllStable => Trigger::AllStable,
        }
    }
}
