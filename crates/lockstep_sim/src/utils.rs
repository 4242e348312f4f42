//! Reusable testbench processes.

use std::cell::Cell;
use std::rc::Rc;

use lockstep_common::{SignalId, SimTime, Value};

use crate::context::SimContext;
use crate::error::SimError;
use crate::process::{Process, ProcessBox, Step};
use crate::trigger::{Edge, Trigger};

/// A persistent edge subscription.
///
/// Every time the watched signal changes in a way that matches the edge, the
/// loop spawns a fresh process from its factory (when enabled) and
/// subscribes again. Spawned processes are scheduled at the instant of the
/// edge.
pub struct CallbackLoop {
    name: String,
    signal: SignalId,
    edge: Edge,
    enabled: Rc<Cell<bool>>,
    should_run: Box<dyn Fn() -> bool>,
    factory: Box<dyn FnMut() -> ProcessBox>,
    subscribed: bool,
}

impl CallbackLoop {
    /// Runs `factory` on every change of `signal`.
    pub fn on_change(signal: SignalId, factory: impl FnMut() -> ProcessBox + 'static) -> Self {
        Self::new(signal, Edge::Any, factory)
    }

    /// Runs `factory` whenever `signal` becomes 1.
    pub fn on_rising(signal: SignalId, factory: impl FnMut() -> ProcessBox + 'static) -> Self {
        Self::new(signal, Edge::Rising, factory)
    }

    /// Runs `factory` whenever `signal` becomes 0.
    pub fn on_falling(signal: SignalId, factory: impl FnMut() -> ProcessBox + 'static) -> Self {
        Self::new(signal, Edge::Falling, factory)
    }

    fn new(signal: SignalId, edge: Edge, factory: impl FnMut() -> ProcessBox + 'static) -> Self {
        Self {
            name: "callback-loop".into(),
            signal,
            edge,
            enabled: Rc::new(Cell::new(true)),
            should_run: Box::new(|| true),
            factory: Box::new(factory),
            subscribed: false,
        }
    }

    /// Only spawn while `predicate` holds, in addition to the enable flag.
    pub fn with_condition(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.should_run = Box::new(predicate);
        self
    }

    /// Names the loop in logs and error reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a shared handle to the enable flag.
    pub fn enable_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.enabled)
    }

    /// Enables or disables spawning. The subscription itself stays alive.
    pub fn set_enable(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Converts the loop into a process for the kernel.
    pub fn boxed(self) -> ProcessBox {
        Box::new(self)
    }
}

impl Process for CallbackLoop {
    fn resume(&mut self, _ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        let wait = Step::Wait(Trigger::Edge(self.signal, self.edge));
        if !self.subscribed {
            self.subscribed = true;
            return Ok(wait);
        }
        if self.enabled.get() && (self.should_run)() {
            self.subscribed = false;
            return Ok(Step::Spawn((self.factory)()));
        }
        Ok(wait)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// State of an [`oscillate`] process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OscState {
    Start,
    Prime,
    Idle,
    RiseReq,
    Rise,
    FallReq,
    Fall,
}

struct Oscillator {
    signal: SignalId,
    half_period: SimTime,
    init_wait: SimTime,
    state: OscState,
}

impl Process for Oscillator {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        let (next, trigger) = match self.state {
            OscState::Start => (OscState::Prime, Trigger::WriteOnly),
            OscState::Prime => {
                ctx.write(self.signal, Value::ZERO)?;
                (OscState::Idle, Trigger::Timer(self.init_wait))
            }
            OscState::Idle => (OscState::RiseReq, Trigger::Timer(self.half_period)),
            OscState::RiseReq => (OscState::Rise, Trigger::WriteOnly),
            OscState::Rise => {
                ctx.write(self.signal, Value::ONE)?;
                (OscState::FallReq, Trigger::Timer(self.half_period))
            }
            OscState::FallReq => (OscState::Fall, Trigger::WriteOnly),
            OscState::Fall => {
                ctx.write(self.signal, Value::ZERO)?;
                (OscState::RiseReq, Trigger::Timer(self.half_period))
            }
        };
        self.state = next;
        Ok(Step::Wait(trigger))
    }

    fn name(&self) -> &str {
        "oscillate"
    }
}

/// A periodic 0/1 stimulus on `signal`.
///
/// The signal is driven low at once, then after `init_wait` it toggles every
/// `period / 2` ticks, starting high. Every write happens in the WriteOnly
/// phase.
pub fn oscillate(signal: SignalId, period: SimTime, init_wait: SimTime) -> ProcessBox {
    Box::new(Oscillator {
        signal,
        half_period: period / 2,
        init_wait,
        state: OscState::Start,
    })
}
