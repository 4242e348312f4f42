//! Plain-storage evaluator for agent unit tests.

use lockstep_common::{SignalId, Value};
use lockstep_sim::{EvalStatus, Evaluator, SignalInfo, SimError};

/// Signals with no logic between them: every value is whatever the
/// testbench last wrote.
pub(crate) struct Wires {
    infos: Vec<SignalInfo>,
    values: Vec<Value>,
    evaluated: bool,
}

impl Wires {
    pub(crate) fn new(signals: &[(&str, u32)]) -> Box<Self> {
        Self::with_initial(signals, Value::ZERO)
    }

    pub(crate) fn undefined(signals: &[(&str, u32)]) -> Box<Self> {
        Self::with_initial(signals, Value::Undefined)
    }

    fn with_initial(signals: &[(&str, u32)], initial: Value) -> Box<Self> {
        Box::new(Self {
            infos: signals
                .iter()
                .map(|(name, width)| SignalInfo::new(*name, *width))
                .collect(),
            values: vec![initial; signals.len()],
            evaluated: false,
        })
    }
}

impl Evaluator for Wires {
    fn signals(&self) -> &[SignalInfo] {
        &self.infos
    }

    fn eval(&mut self) -> Result<EvalStatus, SimError> {
        if self.evaluated {
            Ok(EvalStatus::EndOfStep)
        } else {
            self.evaluated = true;
            Ok(EvalStatus::CombUpdateDone)
        }
    }

    fn reset_eval(&mut self) {
        self.evaluated = false;
    }

    fn set_write_only(&mut self) {
        self.evaluated = false;
    }

    fn read(&self, signal: SignalId) -> Value {
        self.values[signal.index()]
    }

    fn write(&mut self, signal: SignalId, value: Value) {
        self.values[signal.index()] = value;
    }

    fn drain_events(&mut self) -> Vec<SignalId> {
        Vec::new()
    }
}
