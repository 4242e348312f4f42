//! An evaluator wrapper that logs every write reaching the circuit.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use lockstep_common::{SignalId, Value};
use lockstep_sim::{EvalStatus, Evaluator, SignalInfo, SimError};

/// Writes in the order the circuit received them.
pub type WriteLog = Rc<RefCell<Vec<(SignalId, Value)>>>;

/// Forwards everything to `inner` and appends each write to a shared log.
pub struct Recording<E> {
    inner: E,
    log: WriteLog,
}

impl<E: Evaluator> Recording<E> {
    /// Wraps `inner`; the returned log stays readable after the simulator
    /// has taken ownership of the wrapper.
    pub fn new(inner: E) -> (Self, WriteLog) {
        let log = WriteLog::default();
        (
            Self {
                inner,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

/// The values written to `signal`, in order.
pub fn writes_to(log: &WriteLog, signal: SignalId) -> Vec<Value> {
    log.borrow()
        .iter()
        .filter(|(id, _)| *id == signal)
        .map(|(_, value)| *value)
        .collect()
}

impl<E: Evaluator> Evaluator for Recording<E> {
    fn signals(&self) -> &[SignalInfo] {
        self.inner.signals()
    }

    fn eval(&mut self) -> Result<EvalStatus, SimError> {
        self.inner.eval()
    }

    fn reset_eval(&mut self) {
        self.inner.reset_eval();
    }

    fn set_write_only(&mut self) {
        self.inner.set_write_only();
    }

    fn read(&self, signal: SignalId) -> Value {
        self.inner.read(signal)
    }

    fn write(&mut self, signal: SignalId, value: Value) {
        self.log.borrow_mut().push((signal, value));
        self.inner.write(signal, value);
    }

    fn drain_events(&mut self) -> Vec<SignalId> {
        self.inner.drain_events()
    }

    fn set_trace_file(&mut self, path: &Path, depth: i32) -> Result<(), SimError> {
        self.inner.set_trace_file(path, depth)
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        self.inner.finalize()
    }
}
