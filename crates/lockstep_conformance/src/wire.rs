//! A handshaked pass-through wire: `dataIn` is forwarded to `dataOut`
//! combinationally and `dataOut_rd` back to `dataIn_rd`.

use lockstep_common::{SignalId, Value};
use lockstep_sim::{EvalStatus, Evaluator, SignalInfo, SimError};

/// Width of both data buses.
pub const DATA_WIDTH: u32 = 8;

const SIGNALS: [(&str, u32); 8] = [
    ("clk", 1),
    ("rst_n", 1),
    ("dataIn_data", DATA_WIDTH),
    ("dataIn_rd", 1),
    ("dataIn_vld", 1),
    ("dataOut_data", DATA_WIDTH),
    ("dataOut_rd", 1),
    ("dataOut_vld", 1),
];

const IN_DATA: usize = 2;
const IN_RD: usize = 3;
const IN_VLD: usize = 4;
const OUT_DATA: usize = 5;
const OUT_RD: usize = 6;
const OUT_VLD: usize = 7;

/// `(source, destination)` pairs of the combinational paths.
const PATHS: [(usize, usize); 3] = [(IN_DATA, OUT_DATA), (IN_VLD, OUT_VLD), (OUT_RD, IN_RD)];

/// Software model of the handshaked wire. Has no registers; the clock and
/// reset inputs are accepted and ignored.
pub struct HandshakedWireModel {
    infos: Vec<SignalInfo>,
    values: [Value; 8],
    evaluated: bool,
    events: Vec<SignalId>,
}

impl HandshakedWireModel {
    /// A wire with every signal at 0.
    pub fn new() -> Self {
        Self {
            infos: SIGNALS
                .iter()
                .map(|(name, width)| SignalInfo::new(*name, *width))
                .collect(),
            values: [Value::ZERO; 8],
            evaluated: false,
            events: Vec::new(),
        }
    }
}

impl Default for HandshakedWireModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for HandshakedWireModel {
    fn signals(&self) -> &[SignalInfo] {
        &self.infos
    }

    fn eval(&mut self) -> Result<EvalStatus, SimError> {
        if self.evaluated {
            return Ok(EvalStatus::EndOfStep);
        }
        for (src, dst) in PATHS {
            if self.values[dst] != self.values[src] {
                self.values[dst] = self.values[src];
                self.events.push(SignalId::from_raw(dst as u32));
            }
        }
        self.evaluated = true;
        Ok(EvalStatus::CombUpdateDone)
    }

    fn reset_eval(&mut self) {
        self.evaluated = false;
    }

    fn set_write_only(&mut self) {
        self.evaluated = false;
    }

    fn read(&self, signal: SignalId) -> Value {
        self.values
            .get(signal.index())
            .copied()
            .unwrap_or(Value::Undefined)
    }

    fn write(&mut self, signal: SignalId, value: Value) {
        if let Some(slot) = self.values.get_mut(signal.index()) {
            *slot = value;
        }
    }

    fn drain_events(&mut self) -> Vec<SignalId> {
        std::mem::take(&mut self.events)
    }
}
