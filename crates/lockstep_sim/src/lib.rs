//! Delta-cycle co-simulation kernel.
//!
//! This crate coordinates cooperative testbench processes with an external
//! circuit [`Evaluator`]. Every simulation instant is split into four phases
//! (WriteOnly, ReadOnly, CombStable, AllStable) so that testbench writes are
//! resolved by combinational logic before anything samples the circuit, and
//! so that a write requested after a read at the same instant re-runs the
//! evaluation instead of being absorbed into a stale result.
//!
//! # Architecture
//!
//! [`HdlSimulator`] pops a `(time, priority)` calendar in order. Processes
//! implement [`Process`] and return a [`Step`] after each resumption: wait
//! on a [`Trigger`], spawn a child, or finish. Phase triggers join a
//! per-phase barrier whose side effect runs once no matter how many
//! processes wait on it.
//!
//! # Usage
//!
//! ```ignore
//! use lockstep_sim::{oscillate, HdlSimulator};
//!
//! let mut sim = HdlSimulator::new(Box::new(my_evaluator));
//! let clk = sim.signal("clk").unwrap();
//! let summary = sim.run(105_000, vec![oscillate(clk, 10_000, 0)])?;
//! println!("stopped at {}", summary.final_time);
//! ```
//!
//! # Modules
//!
//! - `calendar`: time/priority event queue
//! - `phase`: phases, priorities, access modes and barriers
//! - `trigger`: wait conditions
//! - `process`: the process trait and closure processes
//! - `signal`: signal proxies and edge subscribers
//! - `evaluator`: the circuit evaluator contract
//! - `context`: checked signal access for running processes
//! - `kernel`: the scheduler
//! - `utils`: callback loops and the oscillator

#![warn(missing_docs)]

pub mod calendar;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod kernel;
pub mod phase;
pub mod process;
pub mod signal;
pub mod trigger;
pub mod utils;

#[cfg(test)]
mod testing;

use lockstep_config::BenchConfig;

pub use context::SimContext;
pub use error::SimError;
pub use evaluator::{EvalStatus, Evaluator, SignalInfo};
pub use kernel::{HdlSimulator, RunSummary, DEFAULT_MAX_DELTA_ROUNDS};
pub use phase::{AccessMode, Phase, Priority};
pub use process::{process_fn, Process, ProcessBox, Step};
pub use trigger::{Edge, Trigger};
pub use utils::{oscillate, CallbackLoop};

/// Installs a `tracing` subscriber printing to stderr.
///
/// `RUST_LOG` takes precedence over `filter`. Calling this more than once
/// is harmless; only the first subscriber is installed.
pub fn init_logging(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Runs one complete testbench described by `config`.
///
/// Installs logging with `config.log.filter` (see [`init_logging`]), builds
/// the simulator with the configured kernel limits and trace output, runs
/// `processes` until `config.run.until`, and finalizes the evaluator.
pub fn simulate(
    evaluator: Box<dyn Evaluator>,
    config: &BenchConfig,
    processes: Vec<ProcessBox>,
) -> Result<RunSummary, SimError> {
    init_logging(&config.log.filter);
    let mut sim = HdlSimulator::from_config(evaluator, config)?;
    let summary = sim.run(config.run.until, processes)?;
    sim.finalize()?;
    Ok(summary)
}
