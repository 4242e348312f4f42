//! Test fixtures shared by the kernel's unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use lockstep_common::{SignalId, Value};

use crate::error::SimError;
use crate::evaluator::{EvalStatus, Evaluator, SignalInfo};
use crate::process::{process_fn, ProcessBox, Step};
use crate::trigger::Trigger;

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) const INP: SignalId = SignalId::from_raw(0);
pub(crate) const OUT: SignalId = SignalId::from_raw(1);

/// Two-signal circuit: `out` follows `inp` combinationally.
pub(crate) struct Buffer {
    infos: Vec<SignalInfo>,
    values: [Value; 2],
    events: Vec<SignalId>,
    log: Log,
    stage: u8,
}

impl Buffer {
    pub(crate) fn new(log: Log) -> Box<Self> {
        Box::new(Self {
            infos: vec![SignalInfo::new("inp", 4), SignalInfo::new("out", 4)],
            values: [Value::ZERO, Value::ZERO],
            events: Vec::new(),
            log,
            stage: 0,
        })
    }
}

impl Evaluator for Buffer {
    fn signals(&self) -> &[SignalInfo] {
        &self.infos
    }

    fn eval(&mut self) -> Result<EvalStatus, SimError> {
        if self.stage == 0 {
            self.log.borrow_mut().push("eval:comb".into());
            if self.values[1] != self.values[0] {
                self.values[1] = self.values[0];
                self.events.push(OUT);
            }
            self.stage = 1;
            Ok(EvalStatus::CombUpdateDone)
        } else {
            self.log.borrow_mut().push("eval:end".into());
            Ok(EvalStatus::EndOfStep)
        }
    }

    fn reset_eval(&mut self) {
        self.log.borrow_mut().push("reset_eval".into());
        self.stage = 0;
    }

    fn set_write_only(&mut self) {
        self.stage = 0;
    }

    fn read(&self, signal: SignalId) -> Value {
        self.values[signal.index()]
    }

    fn write(&mut self, signal: SignalId, value: Value) {
        self.values[signal.index()] = value;
    }

    fn drain_events(&mut self) -> Vec<SignalId> {
        std::mem::take(&mut self.events)
    }
}

/// A process that walks through a fixed list of triggers and logs
/// `name@time` on every resumption after the first.
pub(crate) fn waiter(name: &'static str, log: &Log, triggers: Vec<Trigger>) -> ProcessBox {
    let log = log.clone();
    let mut steps = triggers.into_iter();
    let mut started = false;
    process_fn(name, move |ctx| {
        if started {
            log.borrow_mut().push(format!("{name}@{}", ctx.now()));
        }
        started = true;
        Ok(steps.next().map_or(Step::Done, Step::Wait))
    })
}
