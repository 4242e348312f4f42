//! Testbench processes: resumable computations driven by the kernel.
//!
//! A process is resumed by the kernel, does some work against a
//! [`SimContext`], and returns a [`Step`] telling the kernel what to do
//! next. Processes are suspended between resumptions and hold their own
//! state, so long-running behaviour is written as a small state machine.

use crate::context::SimContext;
use crate::error::SimError;
use crate::trigger::Trigger;

/// What a process asks the kernel to do after a resumption.
pub enum Step {
    /// Suspend until the trigger fires.
    Wait(Trigger),
    /// Schedule a child process at the current instant and resume this one
    /// immediately.
    Spawn(ProcessBox),
    /// The process has finished.
    Done,
}

impl From<Trigger> for Step {
    fn from(trigger: Trigger) -> Self {
        Step::Wait(trigger)
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Wait(t) => f.debug_tuple("Wait").field(t).finish(),
            Step::Spawn(p) => f.debug_tuple("Spawn").field(&p.name()).finish(),
            Step::Done => f.write_str("Done"),
        }
    }
}

/// A suspendable unit of testbench behaviour.
pub trait Process {
    /// Resumes the process until it suspends, spawns, or finishes.
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError>;

    /// Name used in logs and error reports.
    fn name(&self) -> &str {
        "process"
    }
}

/// An owned, type-erased process.
pub type ProcessBox = Box<dyn Process>;

/// A process built from a closure. See [`process_fn`].
pub struct FnProcess<F> {
    name: String,
    body: F,
}

impl<F> Process for FnProcess<F>
where
    F: FnMut(&mut SimContext<'_>) -> Result<Step, SimError>,
{
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        (self.body)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wraps a closure as a named process.
///
/// The closure is called once per resumption; state that must survive a
/// suspension lives in variables it captures by move.
pub fn process_fn<F>(name: impl Into<String>, body: F) -> ProcessBox
where
    F: FnMut(&mut SimContext<'_>) -> Result<Step, SimError> + 'static,
{
    Box::new(FnProcess {
        name: name.into(),
        body,
    })
}
