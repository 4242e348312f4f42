//! Simulation error types for the delta-cycle kernel.
//!
//! Every variant is fatal: a violated contract invalidates all data sampled
//! afterwards, so the kernel aborts the run with the current time and the
//! offending signal or process instead of attempting recovery. Reaching the
//! run deadline is not an error and has no variant here.

use std::io;

use lockstep_common::SimTime;

use crate::phase::{AccessMode, Phase};

/// Errors that can occur while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A signal was read or written in the wrong access mode.
    #[error("contract violation at {time}: {access} of '{signal}' while the circuit is {mode}")]
    ContractViolation {
        /// Simulation time of the access.
        time: SimTime,
        /// Name of the accessed signal.
        signal: String,
        /// The attempted access (`"read"` or `"write"`).
        access: &'static str,
        /// The access mode in force at the time.
        mode: AccessMode,
    },

    /// A control line owned by an agent changed without the agent's consent.
    #[error("protocol violation at {time}: '{signal}' is {observed}, expected {expected}")]
    ProtocolViolation {
        /// Simulation time of the check.
        time: SimTime,
        /// Name of the control line.
        signal: String,
        /// The level the owning agent last drove.
        expected: bool,
        /// The level actually observed.
        observed: bool,
    },

    /// A sampled value was undefined where a concrete value was required.
    #[error("invalid signal state at {time}: '{signal}' is undefined")]
    InvalidSignalState {
        /// Simulation time of the sample.
        time: SimTime,
        /// Name of the sampled signal.
        signal: String,
    },

    /// An internal kernel invariant was broken (time moved backwards, the
    /// calendar ran dry, a barrier fired without being registered).
    #[error("scheduling invariant violated at {time}: {reason}")]
    SchedulingInvariant {
        /// Simulation time when the violation was detected.
        time: SimTime,
        /// Description of the broken invariant.
        reason: String,
    },

    /// A phase was requested after the instant had already moved past it.
    #[error("phase {requested} requested at {time} after combinational logic settled")]
    PhaseOrder {
        /// Simulation time of the request.
        time: SimTime,
        /// The phase that was requested.
        requested: Phase,
    },

    /// Too many delta rounds at a single instant, indicating a combinational
    /// loop between the testbench and the circuit.
    #[error("delta round limit exceeded at {time} (max {max_rounds} rounds)")]
    DeltaRoundLimit {
        /// The instant where the limit was hit.
        time: SimTime,
        /// The configured maximum.
        max_rounds: u32,
    },

    /// A signal handle does not belong to the evaluator.
    #[error("unknown signal handle {signal} at {time}")]
    UnknownSignal {
        /// Simulation time of the access.
        time: SimTime,
        /// The raw handle.
        signal: u32,
    },

    /// The external circuit evaluator reported a failure.
    #[error("evaluator error: {reason}")]
    Evaluator {
        /// Description supplied by the evaluator.
        reason: String,
    },

    /// An I/O error occurred in the trace sink.
    #[error("trace I/O error: {0}")]
    Trace(#[from] io::Error),

    /// A process failed; wraps the underlying error with the process identity.
    #[error("process '{process}' failed at {time}: {source}")]
    Process {
        /// Name of the failing process.
        process: String,
        /// Simulation time of the failure.
        time: SimTime,
        /// The failure raised inside the process.
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// Returns the innermost error, looking through process wrappers.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::Process { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violation_display() {
        let e = SimError::ContractViolation {
            time: 5000,
            signal: "clk".into(),
            access: "read",
            mode: AccessMode::WriteOnly,
        };
        assert_eq!(
            e.to_string(),
            "contract violation at 5000: read of 'clk' while the circuit is write-only"
        );
    }

    #[test]
    fn protocol_violation_display() {
        let e = SimError::ProtocolViolation {
            time: 25000,
            signal: "dataOut_rd".into(),
            expected: true,
            observed: false,
        };
        assert_eq!(
            e.to_string(),
            "protocol violation at 25000: 'dataOut_rd' is false, expected true"
        );
    }

    #[test]
    fn invalid_signal_state_display() {
        let e = SimError::InvalidSignalState {
            time: 15,
            signal: "vld".into(),
        };
        assert_eq!(e.to_string(), "invalid signal state at 15: 'vld' is undefined");
    }

    #[test]
    fn phase_order_display() {
        let e = SimError::PhaseOrder {
            time: 7,
            requested: Phase::WriteOnly,
        };
        assert_eq!(
            e.to_string(),
            "phase WriteOnly requested at 7 after combinational logic settled"
        );
    }

    #[test]
    fn delta_round_limit_display() {
        let e = SimError::DeltaRoundLimit {
            time: 100,
            max_rounds: 16,
        };
        assert_eq!(
            e.to_string(),
            "delta round limit exceeded at 100 (max 16 rounds)"
        );
    }

    #[test]
    fn unknown_signal_display() {
        let e = SimError::UnknownSignal {
            time: 20,
            signal: 9,
        };
        assert_eq!(e.to_string(), "unknown signal handle 9 at 20");
    }

    #[test]
    fn trace_io_display() {
        let e = SimError::Trace(io::Error::new(io::ErrorKind::NotFound, "no such dir"));
        assert!(e.to_string().starts_with("trace I/O error"));
    }

    #[test]
    fn process_wrapper_keeps_root() {
        let inner = SimError::InvalidSignalState {
            time: 3,
            signal: "rd".into(),
        };
        let e = SimError::Process {
            process: "driver".into(),
            time: 3,
            source: Box::new(inner),
        };
        assert!(e.to_string().starts_with("process 'driver' failed at 3: "));
        assert!(matches!(e.root(), SimError::InvalidSignalState { .. }));
    }
}
