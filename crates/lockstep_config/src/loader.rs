//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BenchConfig;
use std::path::Path;

/// File name looked up inside a testbench directory.
pub const CONFIG_FILE_NAME: &str = "lockstep.toml";

/// Loads and validates a `lockstep.toml` configuration from a testbench directory.
pub fn load_config(bench_dir: &Path) -> Result<BenchConfig, ConfigError> {
    let content = std::fs::read_to_string(bench_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a `lockstep.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<BenchConfig, ConfigError> {
    let config: BenchConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable by the kernel.
fn validate_config(config: &BenchConfig) -> Result<(), ConfigError> {
    if config.run.until == 0 {
        return Err(ConfigError::ValidationError(
            "run.until must be positive".to_string(),
        ));
    }
    if config.run.clk_period == 0 || !config.run.clk_period.is_multiple_of(2) {
        return Err(ConfigError::ValidationError(format!(
            "run.clk_period must be a positive even number of ticks, got {}",
            config.run.clk_period
        )));
    }
    if config.kernel.max_delta_rounds == 0 {
        return Err(ConfigError::ValidationError(
            "kernel.max_delta_rounds must be positive".to_string(),
        ));
    }
    if let Some(trace) = &config.trace {
        if trace.depth < -1 {
            return Err(ConfigError::ValidationError(format!(
                "trace.depth must be -1 or a level count, got {}",
                trace.depth
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_common::CLK_PERIOD;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str("[run]\nuntil = 105000\n").unwrap();
        assert_eq!(config.run.until, 105_000);
        assert_eq!(config.run.clk_period, CLK_PERIOD);
        assert_eq!(config.kernel.max_delta_rounds, 10_000);
        assert!(config.trace.is_none());
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[run]
until = 205000
clk_period = 20000

[kernel]
max_delta_rounds = 64

[trace]
path = "build/handshake.vcd"
depth = 2

[log]
filter = "lockstep_sim=trace"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.run.clk_period, 20_000);
        assert_eq!(config.kernel.max_delta_rounds, 64);
        let trace = config.trace.unwrap();
        assert_eq!(trace.path, Path::new("build/handshake.vcd"));
        assert_eq!(trace.depth, 2);
        assert_eq!(config.log.filter, "lockstep_sim=trace");
    }

    #[test]
    fn trace_depth_defaults_to_all_levels() {
        let toml = "[run]\nuntil = 10\n[trace]\npath = \"a.vcd\"\n";
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.trace.unwrap().depth, -1);
    }

    #[test]
    fn zero_deadline_errors() {
        let err = load_config_from_str("[run]\nuntil = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn odd_clock_period_errors() {
        let err = load_config_from_str("[run]\nuntil = 100\nclk_period = 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_delta_rounds_errors() {
        let toml = "[run]\nuntil = 100\n[kernel]\nmax_delta_rounds = 0\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_trace_depth_errors() {
        let toml = "[run]\nuntil = 100\n[trace]\npath = \"a.vcd\"\ndepth = -3\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_run_section_errors() {
        let err = load_config_from_str("[kernel]\nmax_delta_rounds = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[run]\nuntil = 42\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.run.until, 42);
    }

    #[test]
    fn load_from_missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
