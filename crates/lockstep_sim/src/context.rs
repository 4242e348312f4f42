//! The view of the simulation a process gets while it is running.

use lockstep_common::{SignalId, SimTime, Value};

use crate::error::SimError;
use crate::evaluator::Evaluator;
use crate::phase::AccessMode;
use crate::process::ProcessBox;
use crate::signal::SignalRegistry;

/// Access to circuit signals and simulation time during one resumption.
///
/// All signal traffic goes through this type so that the access-mode
/// contract is checked on every read and write.
pub struct SimContext<'a> {
    now: SimTime,
    mode: AccessMode,
    evaluator: &'a mut dyn Evaluator,
    signals: &'a mut SignalRegistry<ProcessBox>,
    woken: &'a mut Vec<ProcessBox>,
    wrote: bool,
}

impl<'a> SimContext<'a> {
    pub(crate) fn new(
        now: SimTime,
        mode: AccessMode,
        evaluator: &'a mut dyn Evaluator,
        signals: &'a mut SignalRegistry<ProcessBox>,
        woken: &'a mut Vec<ProcessBox>,
    ) -> Self {
        Self {
            now,
            mode,
            evaluator,
            signals,
            woken,
            wrote: false,
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Current access mode.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Looks up a signal handle by name.
    pub fn signal(&self, name: &str) -> Option<SignalId> {
        self.signals.find(name)
    }

    /// Returns the name of a signal, for diagnostics.
    pub fn signal_name(&self, signal: SignalId) -> String {
        self.signals.name_of(signal)
    }

    /// Reads a signal. Only legal while the circuit is read-only.
    pub fn read(&self, signal: SignalId) -> Result<Value, SimError> {
        let proxy = self.signals.get(signal, self.now)?;
        if self.mode != AccessMode::ReadOnly {
            return Err(SimError::ContractViolation {
                time: self.now,
                signal: proxy.name().to_string(),
                access: "read",
                mode: self.mode,
            });
        }
        Ok(self.evaluator.read(signal))
    }

    /// Reads a signal as a boolean level.
    pub fn read_bool(&self, signal: SignalId) -> Result<bool, SimError> {
        self.read(signal)?
            .to_bool()
            .map_err(|_| self.invalid_state(signal))
    }

    /// Reads a signal as an unsigned integer.
    pub fn read_u128(&self, signal: SignalId) -> Result<u128, SimError> {
        self.read(signal)?
            .to_u128()
            .map_err(|_| self.invalid_state(signal))
    }

    /// Writes a signal. Only legal while the circuit is write-only.
    ///
    /// The value is masked to the signal width. Writing the value the signal
    /// already holds is a no-op and wakes no edge subscribers.
    pub fn write(&mut self, signal: SignalId, value: impl Into<Value>) -> Result<(), SimError> {
        let proxy = self.signals.get(signal, self.now)?;
        if self.mode != AccessMode::WriteOnly {
            return Err(SimError::ContractViolation {
                time: self.now,
                signal: proxy.name().to_string(),
                access: "write",
                mode: self.mode,
            });
        }
        let new = value.into().truncate(proxy.width());
        if self.evaluator.read(signal) == new {
            return Ok(());
        }
        tracing::trace!(time = self.now, signal = proxy.name(), value = %new, "write");
        self.evaluator.write(signal, new);
        self.wrote = true;
        self.signals.notify(signal, new, self.woken);
        Ok(())
    }

    /// Builds the error for a control line that changed behind its owner's back.
    pub fn protocol_violation(&self, signal: SignalId, expected: bool, observed: bool) -> SimError {
        SimError::ProtocolViolation {
            time: self.now,
            signal: self.signal_name(signal),
            expected,
            observed,
        }
    }

    /// Builds the error for an undefined sample of `signal`.
    pub fn invalid_state(&self, signal: SignalId) -> SimError {
        SimError::InvalidSignalState {
            time: self.now,
            signal: self.signal_name(signal),
        }
    }

    pub(crate) fn wrote(&self) -> bool {
        self.wrote
    }
}
