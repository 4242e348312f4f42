//! Valid/ready handshake agent.
//!
//! A transfer happens on a rising clock edge when `valid` and `ready` are
//! both 1 at CombStable. As a [`AgentRole::Driver`] the agent sends the
//! items in [`HandshakeAgent::data`] and owns `valid` and the data lines;
//! as a [`AgentRole::Monitor`] it owns `ready` and appends every received
//! item to the same queue.
//!
//! Both roles remember the last level they drove on each owned line, so a
//! line is never written twice with the same value and any change the agent
//! did not make is reported as a protocol violation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use lockstep_common::{SignalId, Value};
use lockstep_sim::{process_fn, Process, ProcessBox, SimContext, SimError, Step, Trigger};
use tracing::debug;

use crate::base::{Agent, AgentRole, ResetPolarity, SyncAgent};

/// Shared ownership of an agent between the test and its tick processes.
pub type Shared<T> = Rc<RefCell<T>>;

/// Signal access for one handshake interface.
pub trait HandshakeIo {
    /// One transferred item.
    type Item: Clone + PartialEq + fmt::Debug + 'static;

    /// The valid line, driven by the sender.
    fn valid(&self) -> SignalId;

    /// The ready line, driven by the receiver.
    fn ready(&self) -> SignalId;

    /// Samples the data lines.
    fn read_data(&self, ctx: &SimContext<'_>) -> Result<Self::Item, SimError>;

    /// Drives the data lines; `None` drives them undefined.
    fn write_data(
        &self,
        ctx: &mut SimContext<'_>,
        item: Option<&Self::Item>,
    ) -> Result<(), SimError>;
}

/// A handshake interface with a single data signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataLine {
    /// Valid line.
    pub valid: SignalId,
    /// Ready line.
    pub ready: SignalId,
    /// Data signal.
    pub data: SignalId,
}

impl HandshakeIo for DataLine {
    type Item = Value;

    fn valid(&self) -> SignalId {
        self.valid
    }

    fn ready(&self) -> SignalId {
        self.ready
    }

    fn read_data(&self, ctx: &SimContext<'_>) -> Result<Value, SimError> {
        ctx.read(self.data)
    }

    fn write_data(&self, ctx: &mut SimContext<'_>, item: Option<&Value>) -> Result<(), SimError> {
        ctx.write(self.data, item.copied().unwrap_or(Value::Undefined))
    }
}

/// Optional hooks run at fixed points of the protocol.
///
/// Hooks run while the agent is borrowed and must not touch the agent.
pub struct HandshakeCallbacks<T> {
    /// Monitor raised `ready`.
    pub on_monitor_ready: Option<Box<dyn FnMut()>>,
    /// Monitor received an item.
    pub after_read: Option<Box<dyn FnMut(&T)>>,
    /// Driver saw its item accepted.
    pub on_driver_write_ack: Option<Box<dyn FnMut()>>,
    /// An item the driver sent was accepted.
    pub on_done: Option<Box<dyn FnMut(&T)>>,
}

impl<T> Default for HandshakeCallbacks<T> {
    fn default() -> Self {
        Self {
            on_monitor_ready: None,
            after_read: None,
            on_driver_write_ack: None,
            on_done: None,
        }
    }
}

/// Driver or monitor of one valid/ready interface.
pub struct HandshakeAgent<Io: HandshakeIo> {
    base: SyncAgent,
    io: Io,
    /// Items waiting to be sent (driver) or received so far (monitor).
    pub data: VecDeque<Io::Item>,
    /// Item currently offered on the bus.
    in_flight: Option<Io::Item>,
    /// Last value put on the data lines; `None` until the first write.
    last_written: Option<Option<Io::Item>>,
    /// Last level this agent drove on `ready`.
    last_ready: Option<bool>,
    /// Last level this agent drove on `valid`.
    last_valid: Option<bool>,
    /// Protocol hooks.
    pub callbacks: HandshakeCallbacks<Io::Item>,
}

impl<Io: HandshakeIo + 'static> HandshakeAgent<Io> {
    /// Creates an enabled agent with empty queues.
    pub fn new(
        io: Io,
        clk: SignalId,
        rst: SignalId,
        polarity: ResetPolarity,
        role: AgentRole,
    ) -> Self {
        Self {
            base: SyncAgent::new(clk, rst, polarity, role),
            io,
            data: VecDeque::new(),
            in_flight: None,
            last_written: None,
            last_ready: None,
            last_valid: None,
            callbacks: HandshakeCallbacks::default(),
        }
    }

    /// Sets the initial enable state. A disabled agent ignores clock edges
    /// until [`set_enable`](Self::set_enable) turns it on.
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.base.set_enabled(enabled);
        self
    }

    /// Wraps the agent for sharing with its processes.
    pub fn shared(self) -> Shared<Self> {
        Rc::new(RefCell::new(self))
    }

    /// Clock, reset and enable state.
    pub fn base(&self) -> &SyncAgent {
        &self.base
    }

    /// The interface signals.
    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Item currently offered on the bus by a driver.
    pub fn in_flight(&self) -> Option<&Io::Item> {
        self.in_flight.as_ref()
    }

    /// Whether the agent reacts to clock edges.
    pub fn is_enabled(&self) -> bool {
        self.base.is_enabled()
    }

    /// Enables or disables the agent.
    ///
    /// Disabling a driver drops `valid` and disabling a monitor drops
    /// `ready`, unless the line is already low. Queued and in-flight items
    /// are kept. Must be called while the circuit is write-only.
    pub fn set_enable(&mut self, enabled: bool, ctx: &mut SimContext<'_>) -> Result<(), SimError> {
        self.base.set_enabled(enabled);
        if enabled {
            return Ok(());
        }
        match self.base.role() {
            AgentRole::Driver => {
                if self.last_valid != Some(false) {
                    ctx.write(self.io.valid(), false)?;
                    self.last_valid = Some(false);
                }
            }
            AgentRole::Monitor => {
                if self.last_ready != Some(false) {
                    ctx.write(self.io.ready(), false)?;
                    self.last_ready = Some(false);
                }
            }
        }
        Ok(())
    }

    /// One clock tick of the receiving side, as a process.
    pub fn monitor_tick(agent: &Shared<Self>) -> ProcessBox {
        Box::new(MonitorTick {
            agent: Rc::clone(agent),
            state: MonitorState::Start,
        })
    }

    /// One clock tick of the sending side, as a process.
    pub fn driver_tick(agent: &Shared<Self>) -> ProcessBox {
        Box::new(DriverTick {
            agent: Rc::clone(agent),
            state: DriverState::Start,
            valid: false,
        })
    }

    /// Fails unless `line` still carries the level this agent last drove.
    fn check_owned(
        ctx: &SimContext<'_>,
        line: SignalId,
        expected: Option<bool>,
    ) -> Result<(), SimError> {
        let observed = ctx.read_bool(line)?;
        match expected {
            Some(level) if level != observed => {
                Err(ctx.protocol_violation(line, level, observed))
            }
            _ => Ok(()),
        }
    }
}

impl<Io: HandshakeIo + 'static> Agent for Shared<HandshakeAgent<Io>> {
    fn processes(&self) -> Vec<ProcessBox> {
        let agent = self.borrow();
        let handle = Rc::clone(self);
        let lp = match agent.base.role() {
            AgentRole::Driver => agent
                .base
                .tick_loop("handshake-driver", move || HandshakeAgent::driver_tick(&handle)),
            AgentRole::Monitor => agent
                .base
                .tick_loop("handshake-monitor", move || HandshakeAgent::monitor_tick(&handle)),
        };
        vec![lp.boxed()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MonitorState {
    Start,
    Sample,
    RaiseReady,
    DropReady,
    Collect,
}

struct MonitorTick<Io: HandshakeIo> {
    agent: Shared<HandshakeAgent<Io>>,
    state: MonitorState,
}

impl<Io: HandshakeIo + 'static> Process for MonitorTick<Io> {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        let mut agent = self.agent.borrow_mut();
        let ready = agent.io.ready();
        match self.state {
            MonitorState::Start => {
                self.state = MonitorState::Sample;
                Ok(Trigger::ReadOnly.into())
            }
            MonitorState::Sample => {
                let active = agent.base.not_reset(ctx)?;
                let wanted = Some(active);
                if agent.last_ready != wanted {
                    self.state = if active {
                        MonitorState::RaiseReady
                    } else {
                        MonitorState::DropReady
                    };
                    return Ok(Trigger::WriteOnly.into());
                }
                HandshakeAgent::<Io>::check_owned(ctx, ready, agent.last_ready)?;
                if active {
                    self.state = MonitorState::Collect;
                    Ok(Trigger::CombStable.into())
                } else {
                    Ok(Step::Done)
                }
            }
            MonitorState::RaiseReady => {
                ctx.write(ready, true)?;
                agent.last_ready = Some(true);
                if let Some(cb) = agent.callbacks.on_monitor_ready.as_mut() {
                    cb();
                }
                self.state = MonitorState::Collect;
                Ok(Trigger::CombStable.into())
            }
            MonitorState::DropReady => {
                ctx.write(ready, false)?;
                agent.last_ready = Some(false);
                Ok(Step::Done)
            }
            MonitorState::Collect => {
                // A same-instant disable may have pulled ready low since it was raised.
                if !agent.is_enabled() || agent.last_ready != Some(true) {
                    return Ok(Step::Done);
                }
                let valid = agent.io.valid();
                if ctx.read_bool(valid)? {
                    let item = agent.io.read_data(ctx)?;
                    debug!(time = ctx.now(), ?item, "handshake read");
                    if let Some(cb) = agent.callbacks.after_read.as_mut() {
                        cb(&item);
                    }
                    agent.data.push_back(item);
                }
                Ok(Step::Done)
            }
        }
    }

    fn name(&self) -> &str {
        "handshake-monitor-tick"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    Start,
    Load,
    Decide,
    DriveValid,
    Ack,
    Finished,
}

struct DriverTick<Io: HandshakeIo> {
    agent: Shared<HandshakeAgent<Io>>,
    state: DriverState,
    /// Level of `valid` for this tick.
    valid: bool,
}

impl<Io: HandshakeIo + 'static> DriverTick<Io> {
    /// Continues after `valid` has been settled for this tick.
    fn after_valid(&mut self, agent: &HandshakeAgent<Io>) -> Step {
        if agent.is_enabled() {
            self.state = DriverState::Ack;
            return Trigger::CombStable.into();
        }
        // Blocking here could deadlock a re-enable at this same instant.
        self.state = DriverState::Finished;
        let ready = agent.io.ready();
        let mut waited = false;
        Step::Spawn(process_fn("handshake-ready-check", move |ctx| {
            if !waited {
                waited = true;
                return Ok(Trigger::CombStable.into());
            }
            ctx.read_bool(ready)?;
            Ok(Step::Done)
        }))
    }
}

impl<Io: HandshakeIo + 'static> Process for DriverTick<Io> {
    fn resume(&mut self, ctx: &mut SimContext<'_>) -> Result<Step, SimError> {
        let agent_rc = Rc::clone(&self.agent);
        let mut agent = agent_rc.borrow_mut();
        match self.state {
            DriverState::Start => {
                self.state = DriverState::Load;
                Ok(Trigger::WriteOnly.into())
            }
            DriverState::Load => {
                if agent.in_flight.is_none() {
                    agent.in_flight = agent.data.pop_front();
                }
                let current = agent.in_flight.clone();
                if agent.last_written.as_ref() != Some(&current) {
                    agent.io.write_data(ctx, current.as_ref())?;
                    agent.last_written = Some(current);
                }
                self.state = DriverState::Decide;
                Ok(Trigger::ReadOnly.into())
            }
            DriverState::Decide => {
                self.valid = agent.base.not_reset(ctx)? && agent.in_flight.is_some();
                if agent.last_valid != Some(self.valid) {
                    self.state = DriverState::DriveValid;
                    return Ok(Trigger::WriteOnly.into());
                }
                HandshakeAgent::<Io>::check_owned(ctx, agent.io.valid(), agent.last_valid)?;
                Ok(self.after_valid(&agent))
            }
            DriverState::DriveValid => {
                ctx.write(agent.io.valid(), self.valid)?;
                agent.last_valid = Some(self.valid);
                Ok(self.after_valid(&agent))
            }
            DriverState::Ack => {
                let ready = ctx.read_bool(agent.io.ready())?;
                let offered = agent.is_enabled() && agent.last_valid == Some(true);
                if offered && ready {
                    let sent = agent.in_flight.take();
                    agent.in_flight = agent.data.pop_front();
                    debug!(time = ctx.now(), item = ?sent, "handshake write acknowledged");
                    if let Some(cb) = agent.callbacks.on_driver_write_ack.as_mut() {
                        cb();
                    }
                    if let (Some(item), Some(cb)) = (sent, agent.callbacks.on_done.as_mut()) {
                        cb(&item);
                    }
                }
                Ok(Step::Done)
            }
            DriverState::Finished => Ok(Step::Done),
        }
    }

    fn name(&self) -> &str {
        "handshake-driver-tick"
    }
}
