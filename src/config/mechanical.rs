//! Extruder drive configuration and the step-domain constraints derived from it.

use serde::Deserialize;

use super::units::{Millimeters, MillimetersPerSec, MillimetersPerSecSquared};

/// `[extruder]` section: drive parameters shared by every channel stepper.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtruderConfig {
    /// Steps per millimeter of filament on each channel.
    pub steps_per_mm: f32,

    /// Maximum filament feed rate in millimeters per second.
    #[serde(rename = "max_velocity_mm_per_sec")]
    pub max_velocity: MillimetersPerSec,

    /// Maximum filament acceleration in millimeters per second squared.
    #[serde(rename = "max_acceleration_mm_per_sec2")]
    pub max_acceleration: MillimetersPerSecSquared,

    /// Invert direction pin logic on every channel.
    #[serde(default)]
    pub invert_direction: bool,

    /// STEP pulse width in microseconds.
    #[serde(default = "default_pulse_width_us")]
    pub pulse_width_us: u32,
}

fn default_pulse_width_us() -> u32 {
    2
}

/// Derived mechanical parameters computed from the extruder configuration.
///
/// These are computed once at initialization and used for all step timing.
#[derive(Debug, Clone)]
pub struct MechanicalConstraints {
    /// Steps per millimeter of filament.
    pub steps_per_mm: f32,

    /// Maximum velocity in steps per second.
    pub max_velocity_steps_per_sec: f32,

    /// Maximum acceleration in steps per second squared.
    pub max_acceleration_steps_per_sec2: f32,

    /// Minimum step interval in nanoseconds (at max velocity).
    pub min_step_interval_ns: u32,

    /// STEP pulse width in nanoseconds.
    pub pulse_width_ns: u32,

    /// Whether direction pin logic is inverted.
    pub invert_direction: bool,
}

impl MechanicalConstraints {
    /// Compute mechanical constraints from extruder configuration.
    pub fn from_config(config: &ExtruderConfig) -> Self {
        let steps_per_mm = config.steps_per_mm;
        let max_velocity_steps_per_sec = config.max_velocity.0 * steps_per_mm;
        let max_acceleration_steps_per_sec2 = config.max_acceleration.0 * steps_per_mm;

        Self {
            steps_per_mm,
            max_velocity_steps_per_sec,
            max_acceleration_steps_per_sec2,
            min_step_interval_ns: velocity_to_interval_ns(max_velocity_steps_per_sec),
            pulse_width_ns: config.pulse_width_us.saturating_mul(1000),
            invert_direction: config.invert_direction,
        }
    }

    /// Convert millimeters of filament to steps (nearest step).
    #[inline]
    pub fn mm_to_steps(&self, mm: Millimeters) -> i64 {
        libm::roundf(mm.0 * self.steps_per_mm) as i64
    }

    /// Convert steps to millimeters of filament.
    #[inline]
    pub fn steps_to_mm(&self, steps: i64) -> Millimeters {
        Millimeters(steps as f32 / self.steps_per_mm)
    }

    /// Convert mm/sec to steps/sec.
    #[inline]
    pub fn velocity_to_steps(&self, mm_per_sec: f32) -> f32 {
        mm_per_sec * self.steps_per_mm
    }

    /// Calculate step interval for a given velocity in steps/sec.
    #[inline]
    pub fn velocity_to_interval_ns(&self, velocity_steps_per_sec: f32) -> u32 {
        velocity_to_interval_ns(velocity_steps_per_sec)
    }
}

fn velocity_to_interval_ns(velocity_steps_per_sec: f32) -> u32 {
    if velocity_steps_per_sec > 0.0 {
        (1_000_000_000.0 / velocity_steps_per_sec) as u32
    } else {
        u32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> ExtruderConfig {
        ExtruderConfig {
            steps_per_mm: 100.0,
            max_velocity: MillimetersPerSec(25.0),
            max_acceleration: MillimetersPerSecSquared(1000.0),
            invert_direction: false,
            pulse_width_us: 2,
        }
    }

    #[test]
    fn test_velocity_conversion() {
        let constraints = MechanicalConstraints::from_config(&make_test_config());

        // 25 mm/s * 100 steps/mm = 2500 steps/s
        assert!((constraints.max_velocity_steps_per_sec - 2500.0).abs() < 0.1);
        assert!((constraints.max_acceleration_steps_per_sec2 - 100_000.0).abs() < 1.0);
        // 1e9 / 2500 = 400_000 ns
        assert_eq!(constraints.min_step_interval_ns, 400_000);
        assert_eq!(constraints.pulse_width_ns, 2000);
    }

    #[test]
    fn test_mm_steps_roundtrip() {
        let constraints = MechanicalConstraints::from_config(&make_test_config());

        assert_eq!(constraints.mm_to_steps(Millimeters(1.25)), 125);
        assert!((constraints.steps_to_mm(125).0 - 1.25).abs() < 0.0001);
    }

    #[test]
    fn test_zero_velocity_interval() {
        let constraints = MechanicalConstraints::from_config(&make_test_config());
        assert_eq!(constraints.velocity_to_interval_ns(0.0), u32::MAX);
    }
}
