//! Simulation time in integer ticks.
//!
//! The kernel attaches no unit semantics to time: [`SimTime`] is a totally
//! ordered tick count. The constants below fix the conventional mapping of
//! one tick to one picosecond so testbenches can express periods readably.

/// A point in simulation time, in ticks.
pub type SimTime = u64;

/// Ticks per picosecond.
pub const PS: SimTime = 1;
/// Ticks per nanosecond.
pub const NS: SimTime = 1_000 * PS;
/// Ticks per microsecond.
pub const US: SimTime = 1_000 * NS;
/// Ticks per millisecond.
pub const MS: SimTime = 1_000 * US;
/// Ticks per second.
pub const S: SimTime = 1_000 * MS;

/// Default clock period.
///
/// The absolute value carries no meaning; testbenches only rely on it being
/// the same everywhere.
pub const CLK_PERIOD: SimTime = 10 * NS;

/// Formats a tick count with the largest unit that divides it exactly.
pub fn format_time(time: SimTime) -> String {
    if time == 0 {
        return "0 ps".to_string();
    }
    for (unit, name) in [(S, "s"), (MS, "ms"), (US, "us"), (NS, "ns")] {
        if time >= unit && time.is_multiple_of(unit) {
            return format!("{} {name}", time / unit);
        }
    }
    format!("{time} ps")
}
