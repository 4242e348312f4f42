//! Parsing and validation of `lockstep.toml` testbench run configuration.
//!
//! This crate reads the run configuration file and produces a strongly-typed
//! [`BenchConfig`] covering the run deadline, kernel limits, the optional
//! trace sink, and the default log filter.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
