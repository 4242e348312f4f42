//! The boundary between the kernel and an external circuit evaluator.
//!
//! An evaluator owns the circuit state. The kernel never inspects it
//! directly; it only drives the evaluation state machine through
//! [`Evaluator::eval`] and moves values across the boundary with
//! [`Evaluator::read`] and [`Evaluator::write`].

use std::path::Path;

use lockstep_common::{SignalId, Value};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Name and bit width of one signal exposed by an evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Hierarchical name used for lookup and diagnostics.
    pub name: String,
    /// Bit width; written values are masked to it.
    pub width: u32,
}

impl SignalInfo {
    /// Creates a signal description.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

/// Result of advancing the evaluator by one stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalStatus {
    /// Combinational logic has been updated from the latest writes.
    CombUpdateDone,
    /// Registers are about to be updated.
    BeforeEdge,
    /// Evaluation of the current instant is complete.
    EndOfStep,
}

/// A circuit evaluator driven by the kernel.
///
/// Signal handles passed to [`read`](Evaluator::read) and
/// [`write`](Evaluator::write) are indices into [`signals`](Evaluator::signals).
pub trait Evaluator {
    /// Returns the signals this evaluator exposes, in handle order.
    fn signals(&self) -> &[SignalInfo];

    /// Advances the evaluation state machine by one stage.
    fn eval(&mut self) -> Result<EvalStatus, SimError>;

    /// Returns the state machine to its pre-evaluation stage so that
    /// combinational logic is recomputed from fresh writes.
    fn reset_eval(&mut self);

    /// Prepares the evaluator to accept writes for a new instant.
    fn set_write_only(&mut self);

    /// Returns the current value of a signal.
    fn read(&self, signal: SignalId) -> Value;

    /// Sets a signal value; the value is already masked to the signal width.
    fn write(&mut self, signal: SignalId, value: Value);

    /// Returns the signals whose values the circuit itself changed since the
    /// last call, in the order they changed.
    fn drain_events(&mut self) -> Vec<SignalId>;

    /// Directs waveform output to `path`, limited to `depth` hierarchy levels.
    fn set_trace_file(&mut self, path: &Path, depth: i32) -> Result<(), SimError> {
        let _ = (path, depth);
        Ok(())
    }

    /// Flushes and closes evaluator resources at the end of a simulation.
    fn finalize(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}
