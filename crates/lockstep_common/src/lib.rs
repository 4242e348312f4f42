//! Shared foundational types used across the Lockstep co-simulation kernel.
//!
//! This crate provides the tagged signal [`Value`] (a concrete integer or
//! undefined), opaque [`SignalId`] handles, and the [`SimTime`] tick type with
//! its time-unit constants.

#![warn(missing_docs)]

pub mod signal;
pub mod time;
pub mod value;

pub use signal::SignalId;
pub use time::{format_time, SimTime, CLK_PERIOD};
pub use value::{UndefinedValue, Value};
