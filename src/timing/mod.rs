//! Base Time Unit (BTU) conversions
//!
//! The engine runs on an integer time base: 1 BTU = 10 ms of nominal combat
//! time. Wall-clock durations from configuration are converted once at load;
//! the simulation itself never touches milliseconds again.

use crate::core::error::TimingError;
use crate::core::types::Btu;

/// Milliseconds per base time unit
pub const MS_PER_BTU: i64 = 10;

/// Convert a millisecond duration to base time units (truncating)
pub fn to_base_units(ms: i64) -> Result<Btu, TimingError> {
    if ms < 0 {
        return Err(TimingError::InvalidDuration(ms));
    }
    Ok((ms / MS_PER_BTU) as Btu)
}

/// Apply a speed factor to a duration
///
/// Faster actors finish sooner: the duration is divided by the factor and
/// truncated toward zero. A nonzero base duration never collapses below
/// 1 BTU, so an action can never resolve instantaneously.
pub fn apply_speed(duration: Btu, speed_factor: f32) -> Result<Btu, TimingError> {
    if !(speed_factor > 0.0) {
        return Err(TimingError::InvalidSpeed(speed_factor));
    }
    if duration == 0 {
        return Ok(0);
    }
    let scaled = (duration as f64 / speed_factor as f64).trunc() as Btu;
    Ok(scaled.max(1))
}
