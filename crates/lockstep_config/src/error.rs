//! Errors raised while reading a testbench's `lockstep.toml`.
//!
//! A run never starts on a bad configuration. Settings the kernel cannot
//! honor, such as an odd clock period, are rejected before it is built.

/// Errors that can occur when loading or validating a `lockstep.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The testbench directory has no readable `lockstep.toml`.
    #[error("cannot read lockstep.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or lacks the `[run]` section.
    #[error("malformed lockstep.toml: {0}")]
    ParseError(String),

    /// A setting the kernel cannot run with.
    #[error("unusable testbench setting: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn odd_clock_period_names_the_setting() {
        let err = load_config_from_str("[run]\nuntil = 100\nclk_period = 7\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unusable testbench setting: run.clk_period must be a positive even number of ticks, got 7"
        );
    }

    #[test]
    fn missing_run_section_is_malformed() {
        let err = load_config_from_str("[trace]\npath = \"wave.vcd\"\n").unwrap_err();
        assert!(err.to_string().starts_with("malformed lockstep.toml: "));
    }

    #[test]
    fn missing_file_cannot_be_read() {
        let dir = tempfile::tempdir().unwrap();
        let err = crate::loader::load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("cannot read lockstep.toml: "));
    }
}
