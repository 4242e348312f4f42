//! Reference circuits and testbench stimulus for end-to-end kernel tests.
//!
//! The models here stand in for a compiled HDL simulator: each one
//! implements [`lockstep_sim::Evaluator`] with the same stage sequence a
//! real evaluator reports, so complete testbenches can run against them.
//!
//! - [`CounterModel`]: 2-bit counter with synchronous reset and enable
//! - [`HandshakedWireModel`]: valid/ready pass-through wire
//! - [`Recording`]: wraps any evaluator and logs the writes it receives
//! - [`stimulus`]: samplers and enable drivers used by the scenarios

#![warn(missing_docs)]

pub mod counter;
pub mod recording;
pub mod stimulus;
pub mod wire;

pub use counter::CounterModel;
pub use recording::{writes_to, Recording, WriteLog};
pub use stimulus::Samples;
pub use wire::HandshakedWireModel;

use lockstep_common::{SimTime, CLK_PERIOD};

/// Counter output expected when the clock runs with [`CLK_PERIOD`], reset
/// is held for one period and enable rises one period in.
pub const COUNTER_REFERENCE: [(SimTime, u128); 9] = [
    (CLK_PERIOD * 3 / 2, 0),
    (CLK_PERIOD * 5 / 2, 1),
    (CLK_PERIOD * 7 / 2, 2),
    (CLK_PERIOD * 9 / 2, 3),
    (CLK_PERIOD * 11 / 2, 0),
    (CLK_PERIOD * 13 / 2, 1),
    (CLK_PERIOD * 15 / 2, 2),
    (CLK_PERIOD * 17 / 2, 3),
    (CLK_PERIOD * 19 / 2, 0),
];
