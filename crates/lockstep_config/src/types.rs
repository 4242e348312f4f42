//! Configuration types deserialized from `lockstep.toml`.

use lockstep_common::{SimTime, CLK_PERIOD};
use serde::Deserialize;
use std::path::PathBuf;

/// The top-level testbench run configuration.
#[derive(Debug, Deserialize)]
pub struct BenchConfig {
    /// Run deadline and clock period.
    pub run: RunConfig,
    /// Kernel limits.
    #[serde(default)]
    pub kernel: KernelConfig,
    /// Optional waveform trace forwarded to the circuit evaluator.
    #[serde(default)]
    pub trace: Option<TraceConfig>,
    /// Logging defaults.
    #[serde(default)]
    pub log: LogConfig,
}

/// How long to simulate and at what clock rate.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Absolute deadline in ticks; the run stops when it is reached.
    pub until: SimTime,
    /// Clock period in ticks used by clock stimulus.
    #[serde(default = "default_clk_period")]
    pub clk_period: SimTime,
}

/// Limits enforced by the scheduler.
#[derive(Debug, Deserialize)]
pub struct KernelConfig {
    /// Maximum number of delta rounds (WriteOnly firings) at a single instant.
    #[serde(default = "default_max_delta_rounds")]
    pub max_delta_rounds: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_delta_rounds: default_max_delta_rounds(),
        }
    }
}

/// Waveform trace sink settings, opaque to the kernel.
#[derive(Debug, Deserialize)]
pub struct TraceConfig {
    /// Output file (e.g. a VCD path).
    pub path: PathBuf,
    /// Number of hierarchy levels to trace; `-1` traces everything.
    #[serde(default = "default_trace_depth")]
    pub depth: i32,
}

/// Logging settings.
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_clk_period() -> SimTime {
    CLK_PERIOD
}

fn default_max_delta_rounds() -> u32 {
    10_000
}

fn default_trace_depth() -> i32 {
    -1
}

fn default_log_filter() -> String {
    "info".to_string()
}
