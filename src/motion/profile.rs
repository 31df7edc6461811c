//! Extruder motion profiles.
//!
//! Trapezoidal ramps with independent acceleration and deceleration. Step
//! intervals are the exact constant-acceleration spacing (the time between
//! consecutive steps of `s = a t² / 2`), clamped to the cruise interval.

use libm::sqrtf;

use crate::config::MechanicalConstraints;

const NS_PER_SEC: f32 = 1_000_000_000.0;

/// Direction of filament motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Push filament into the nozzle (positive step count).
    #[default]
    Extrude,
    /// Pull filament back (negative step count).
    Retract,
}

impl Direction {
    /// Get direction from signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Extrude
        } else {
            Direction::Retract
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Extrude => 1,
            Direction::Retract => -1,
        }
    }
}

/// Current phase of motion execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    /// Accelerating from rest toward cruise velocity.
    Accelerating,
    /// Moving at constant cruise velocity.
    Cruising,
    /// Decelerating from cruise velocity to rest.
    Decelerating,
    /// Motion complete.
    Complete,
}

/// Computed motion profile for one block.
#[derive(Debug, Clone)]
pub struct MotionProfile {
    /// Total logical steps to move (absolute value).
    pub total_steps: u32,

    /// Direction of motion.
    pub direction: Direction,

    /// Steps in acceleration phase.
    pub accel_steps: u32,

    /// Steps in cruise phase.
    pub cruise_steps: u32,

    /// Steps in deceleration phase.
    pub decel_steps: u32,

    /// Interval before the first step (nanoseconds).
    pub initial_interval_ns: u32,

    /// Cruise step interval (nanoseconds).
    pub cruise_interval_ns: u32,

    /// Acceleration rate in steps/sec².
    pub accel_rate: f32,

    /// Deceleration rate in steps/sec².
    pub decel_rate: f32,
}

impl MotionProfile {
    /// Create an asymmetric trapezoidal motion profile.
    ///
    /// # Arguments
    ///
    /// * `total_steps` - Signed step count (positive extrudes, negative retracts)
    /// * `max_velocity` - Maximum velocity in steps/sec
    /// * `acceleration` - Acceleration rate in steps/sec²
    /// * `deceleration` - Deceleration rate in steps/sec²
    pub fn asymmetric_trapezoidal(
        total_steps: i64,
        max_velocity: f32,
        acceleration: f32,
        deceleration: f32,
    ) -> Self {
        let direction = Direction::from_steps(total_steps);
        let steps = total_steps.unsigned_abs().min(u32::MAX as u64) as u32;

        if steps == 0 || max_velocity <= 0.0 || acceleration <= 0.0 || deceleration <= 0.0 {
            return Self::zero();
        }

        // v² = 2 a s
        let accel_distance = max_velocity * max_velocity / (2.0 * acceleration);
        let decel_distance = max_velocity * max_velocity / (2.0 * deceleration);

        let (accel_steps, cruise_steps, decel_steps) =
            if accel_distance + decel_distance >= steps as f32 {
                // Triangle: both ramps meet at the same peak velocity, so a·s_a = d·s_d
                let ratio = deceleration / (acceleration + deceleration);
                let accel_steps = libm::roundf(steps as f32 * ratio) as u32;
                let accel_steps = accel_steps.min(steps);
                (accel_steps, 0u32, steps - accel_steps)
            } else {
                let accel_steps = accel_distance as u32;
                let decel_steps = decel_distance as u32;
                let cruise_steps = steps.saturating_sub(accel_steps + decel_steps);
                (accel_steps, cruise_steps, decel_steps)
            };

        let cruise_interval_ns = (NS_PER_SEC / max_velocity) as u32;
        let initial_interval_ns =
            ((sqrtf(2.0 / acceleration) * NS_PER_SEC) as u32).max(cruise_interval_ns);

        Self {
            total_steps: steps,
            direction,
            accel_steps,
            cruise_steps,
            decel_steps,
            initial_interval_ns,
            cruise_interval_ns,
            accel_rate: acceleration,
            decel_rate: deceleration,
        }
    }

    /// Create a symmetric trapezoidal profile (same accel and decel).
    pub fn symmetric_trapezoidal(total_steps: i64, max_velocity: f32, acceleration: f32) -> Self {
        Self::asymmetric_trapezoidal(total_steps, max_velocity, acceleration, acceleration)
    }

    /// Profile for a block of `steps` in `direction` at the extruder's limits.
    pub fn for_extruder(steps: u32, direction: Direction, constraints: &MechanicalConstraints) -> Self {
        let signed = steps as i64 * direction.sign();
        let mut profile = Self::symmetric_trapezoidal(
            signed,
            constraints.max_velocity_steps_per_sec,
            constraints.max_acceleration_steps_per_sec2,
        );
        profile.cruise_interval_ns = profile.cruise_interval_ns.max(constraints.min_step_interval_ns);
        profile.initial_interval_ns = profile.initial_interval_ns.max(profile.cruise_interval_ns);
        profile.direction = direction;
        profile
    }

    /// Create a zero-length profile (no motion).
    pub fn zero() -> Self {
        Self {
            total_steps: 0,
            direction: Direction::Extrude,
            accel_steps: 0,
            cruise_steps: 0,
            decel_steps: 0,
            initial_interval_ns: u32::MAX,
            cruise_interval_ns: u32::MAX,
            accel_rate: 0.0,
            decel_rate: 0.0,
        }
    }

    /// Check if this is a zero-length profile.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.total_steps == 0
    }

    /// Get the phase at a given step number.
    pub fn phase_at(&self, step: u32) -> MotionPhase {
        if step >= self.total_steps {
            MotionPhase::Complete
        } else if step < self.accel_steps {
            MotionPhase::Accelerating
        } else if step < self.accel_steps + self.cruise_steps {
            MotionPhase::Cruising
        } else {
            MotionPhase::Decelerating
        }
    }

    /// Interval preceding step `step`, in nanoseconds.
    pub fn interval_at(&self, step: u32) -> u32 {
        match self.phase_at(step) {
            MotionPhase::Complete => u32::MAX,
            MotionPhase::Cruising => self.cruise_interval_ns,
            MotionPhase::Accelerating => self.ramp_interval(step as f32, self.accel_rate),
            MotionPhase::Decelerating => {
                // mirror of the acceleration ramp, counted from the end
                let remaining = self.total_steps - step;
                self.ramp_interval((remaining - 1) as f32, self.decel_rate)
            }
        }
    }

    /// Time between steps `n` and `n + 1` of a ramp from rest.
    fn ramp_interval(&self, n: f32, rate: f32) -> u32 {
        let t0 = sqrtf(2.0 * n / rate);
        let t1 = sqrtf(2.0 * (n + 1.0) / rate);
        (((t1 - t0) * NS_PER_SEC) as u32).max(self.cruise_interval_ns)
    }

    /// Total duration of the profile in seconds.
    pub fn estimated_duration_secs(&self) -> f32 {
        if self.total_steps == 0 {
            return 0.0;
        }

        let cruise_velocity = NS_PER_SEC / self.cruise_interval_ns as f32;
        let accel_time = sqrtf(2.0 * self.accel_steps as f32 / self.accel_rate);
        let cruise_time = self.cruise_steps as f32 / cruise_velocity;
        let decel_time = sqrtf(2.0 * self.decel_steps as f32 / self.decel_rate);

        accel_time + cruise_time + decel_time
    }
}
