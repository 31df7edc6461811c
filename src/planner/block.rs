//! Planned extruder moves.

use crate::config::MechanicalConstraints;
use crate::config::Millimeters;
use crate::error::{Error, MotionError, Result};
use crate::mixer::{AxisLocks, MixRow, MixingEngine};
use crate::motion::Direction;

use super::queue::BlockProducer;

/// Source of the machine's current Z height.
pub trait ZPosition {
    /// Z height in millimeters.
    fn z_position_mm(&self) -> f32;
}

impl ZPosition for f32 {
    fn z_position_mm(&self) -> f32 {
        *self
    }
}

impl ZPosition for Millimeters {
    fn z_position_mm(&self) -> f32 {
        self.0
    }
}

/// One extruder move with the row it was planned with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixBlock {
    /// Logical extruder steps, shared out across channels.
    pub steps: u32,
    /// Filament direction.
    pub direction: Direction,
    /// Row copied from the engine at planning time.
    pub color: MixRow,
}

impl MixBlock {
    /// Create a block.
    pub fn new(steps: u32, direction: Direction, color: MixRow) -> Self {
        Self {
            steps,
            direction,
            color,
        }
    }

    /// Block for a signed step count.
    pub fn from_steps(steps: i64, color: MixRow) -> Self {
        let count = steps.unsigned_abs().min(u32::MAX as u64) as u32;
        Self::new(count, Direction::from_steps(steps), color)
    }

    /// Block for a filament length; negative lengths retract.
    pub fn from_mm(length: Millimeters, constraints: &MechanicalConstraints, color: MixRow) -> Self {
        Self::from_steps(constraints.mm_to_steps(length), color)
    }

    /// Signed step count.
    #[inline]
    pub fn signed_steps(&self) -> i64 {
        self.steps as i64 * self.direction.sign()
    }

    /// True if the block moves nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }
}

/// Plan one extruder move of `steps` at the height `z` and queue it.
///
/// Runs the gradient hook for `z`, copies the engine's current row into the
/// block and pushes it. Nothing is changed if the queue is full.
pub fn plan_move<L, Z, const N: usize>(
    engine: &mut MixingEngine<L>,
    producer: &mut BlockProducer<'_, N>,
    steps: i64,
    z: &Z,
) -> Result<()>
where
    L: AxisLocks,
    Z: ZPosition + ?Sized,
{
    if producer.is_full() {
        warn!("block queue full, move of {} steps rejected", steps);
        return Err(Error::Motion(MotionError::QueueFull));
    }

    engine.gradient_control(z.z_position_mm())?;

    let mut block = MixBlock::from_steps(steps, MixRow::zero(engine.capabilities().channels()));
    engine.populate_block(&mut block);
    trace!("planned block: {} steps", block.steps);
    producer.push(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtruderConfig, MillimetersPerSec, MillimetersPerSecSquared};
    use crate::mixer::COLOR_A_MASK;

    #[test]
    fn test_from_steps_direction() {
        let row = MixRow::pure(2, 0);
        let block = MixBlock::from_steps(-40, row);

        assert_eq!(block.steps, 40);
        assert_eq!(block.direction, Direction::Retract);
        assert_eq!(block.signed_steps(), -40);
    }

    #[test]
    fn test_from_mm() {
        let constraints = MechanicalConstraints::from_config(&ExtruderConfig {
            steps_per_mm: 93.0,
            max_velocity: MillimetersPerSec(25.0),
            max_acceleration: MillimetersPerSecSquared(1000.0),
            invert_direction: false,
            pulse_width_us: 2,
        });
        let block = MixBlock::from_mm(Millimeters(2.0), &constraints, MixRow::full(2));

        assert_eq!(block.steps, 186);
        assert_eq!(block.direction, Direction::Extrude);
        assert_eq!(block.color.weights(), &[COLOR_A_MASK, COLOR_A_MASK]);
    }
}
