//! A 2-bit counter with synchronous reset and enable.
//!
//! Equivalent to:
//!
//! ```verilog
//! always @(posedge clk)
//!     if (rst) val <= 0;
//!     else if (en) val <= val + 1;
//! ```

use lockstep_common::{SignalId, Value};
use lockstep_sim::{EvalStatus, Evaluator, SignalInfo, SimError};
use tracing::trace;

/// Clock input.
pub const CLK: SignalId = SignalId::from_raw(0);
/// Synchronous active-high reset.
pub const RST: SignalId = SignalId::from_raw(1);
/// Count enable.
pub const EN: SignalId = SignalId::from_raw(2);
/// Counter output, 2 bits wide.
pub const VAL: SignalId = SignalId::from_raw(3);

const WIDTH: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    /// Waiting for the combinational pass of this instant.
    Comb,
    /// A rising clock edge was seen; registers update next.
    Edge,
    /// Registers update on the next call.
    Update,
    /// No edge at this instant; only the clock history is committed.
    Commit,
    Done,
}

/// Software model of the counter.
///
/// The rising edge is detected against the clock level committed at the
/// end of the previous instant, so re-running the combinational pass after
/// a late write sees the same edge again and samples the fresh inputs.
pub struct CounterModel {
    infos: Vec<SignalInfo>,
    values: [Value; 4],
    clk_prev: Value,
    stage: Stage,
    events: Vec<SignalId>,
}

impl CounterModel {
    /// A counter with every signal at 0.
    pub fn new() -> Self {
        Self {
            infos: vec![
                SignalInfo::new("clk", 1),
                SignalInfo::new("rst", 1),
                SignalInfo::new("en", 1),
                SignalInfo::new("val", WIDTH),
            ],
            values: [Value::ZERO; 4],
            clk_prev: Value::ZERO,
            stage: Stage::Comb,
            events: Vec::new(),
        }
    }

    fn next_val(&self) -> Value {
        let val = self.values[VAL.index()];
        match (
            self.values[RST.index()].to_bool(),
            self.values[EN.index()].to_bool(),
        ) {
            (Ok(true), _) => Value::ZERO,
            (Ok(false), Ok(false)) => val,
            (Ok(false), Ok(true)) => match val {
                Value::Concrete(v) => Value::Concrete(v.wrapping_add(1)).truncate(WIDTH),
                Value::Undefined => Value::Undefined,
            },
            _ => Value::Undefined,
        }
    }
}

impl Default for CounterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for CounterModel {
    fn signals(&self) -> &[SignalInfo] {
        &self.infos
    }

    fn eval(&mut self) -> Result<EvalStatus, SimError> {
        match self.stage {
            Stage::Comb => {
                let clk = self.values[CLK.index()];
                let rising = clk == Value::ONE && self.clk_prev != Value::ONE;
                self.stage = if rising { Stage::Edge } else { Stage::Commit };
                Ok(EvalStatus::CombUpdateDone)
            }
            Stage::Edge => {
                self.stage = Stage::Update;
                Ok(EvalStatus::BeforeEdge)
            }
            Stage::Update => {
                let next = self.next_val();
                if next != self.values[VAL.index()] {
                    trace!(value = %next, "counter update");
                    self.values[VAL.index()] = next;
                    self.events.push(VAL);
                }
                self.clk_prev = self.values[CLK.index()];
                self.stage = Stage::Done;
                Ok(EvalStatus::EndOfStep)
            }
            Stage::Commit => {
                self.clk_prev = self.values[CLK.index()];
                self.stage = Stage::Done;
                Ok(EvalStatus::EndOfStep)
            }
            Stage::Done => Ok(EvalStatus::EndOfStep),
        }
    }

    fn reset_eval(&mut self) {
        self.stage = Stage::Comb;
    }

    fn set_write_only(&mut self) {
        self.stage = Stage::Comb;
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
