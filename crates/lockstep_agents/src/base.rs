//! Shared state of clock-synchronous agents.

use std::cell::Cell;
use std::rc::Rc;

use lockstep_common::SignalId;
use lockstep_sim::{CallbackLoop, ProcessBox, SimContext, SimError};

/// Which side of an interface an agent plays.
///
/// The role is fixed at construction and selects both the process the agent
/// runs and what disabling it does to the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    /// Sends items: owns the valid and data lines.
    Driver,
    /// Receives items: owns the ready line.
    Monitor,
}

/// Level at which a reset line is asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetPolarity {
    /// Reset is active while the line is 1.
    ActiveHigh,
    /// Reset is active while the line is 0.
    ActiveLow,
}

/// Something that contributes processes to a simulation.
pub trait Agent {
    /// Returns the processes to start when the simulation begins.
    fn processes(&self) -> Vec<ProcessBox>;
}

/// Clock, reset and enable state common to synchronous agents.
#[derive(Clone, Debug)]
pub struct SyncAgent {
    clk: SignalId,
    rst: SignalId,
    polarity: ResetPolarity,
    role: AgentRole,
    enabled: Rc<Cell<bool>>,
}

impl SyncAgent {
    /// Creates an enabled agent clocked by `clk` and reset by `rst`.
    pub fn new(clk: SignalId, rst: SignalId, polarity: ResetPolarity, role: AgentRole) -> Self {
        Self {
            clk,
            rst,
            polarity,
            role,
            enabled: Rc::new(Cell::new(true)),
        }
    }

    /// Sets the initial enable state.
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.set(enabled);
        self
    }

    /// Clock signal.
    pub fn clk(&self) -> SignalId {
        self.clk
    }

    /// Reset signal.
    pub fn rst(&self) -> SignalId {
        self.rst
    }

    /// Role chosen at construction.
    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Whether the agent's tick process runs on clock edges.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Returns `true` when the reset line is inactive.
    pub fn not_reset(&self, ctx: &SimContext<'_>) -> Result<bool, SimError> {
        let level = ctx.read_bool(self.rst)?;
        Ok(match self.polarity {
            ResetPolarity::ActiveHigh => !level,
            ResetPolarity::ActiveLow => level,
        })
    }

    /// Builds a loop that spawns a tick from `factory` on every rising clock
    /// edge while the agent is enabled.
    pub fn tick_loop(
        &self,
        name: &str,
        factory: impl FnMut() -> ProcessBox + 'static,
    ) -> CallbackLoop {
        let enabled = Rc::clone(&self.enabled);
        CallbackLoop::on_rising(self.clk, factory)
            .with_condition(move || enabled.get())
            .with_name(name)
    }
}
