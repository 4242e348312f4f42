//! Clock-synchronous protocol agents for the Lockstep co-simulation kernel.
//!
//! Agents are testbench-side drivers and monitors built on the kernel's
//! process and phase primitives. This crate provides the shared agent base
//! (role, reset polarity, enable flag), the valid/ready handshake agent, and
//! pull-up / pull-down reset drivers.

#![warn(missing_docs)]

pub mod base;
pub mod handshake;
pub mod rst;

#[cfg(test)]
mod testing;

pub use base::{Agent, AgentRole, ResetPolarity, SyncAgent};
pub use handshake::{DataLine, HandshakeAgent, HandshakeCallbacks, HandshakeIo, Shared};
pub use rst::{PullDown, PullUp, DEFAULT_RESET_DELAY};
