//! Lock coordination for redundant actuators.
//!
//! An actuator tied to a channel is locked exactly when the active row gives
//! that channel zero weight, so idle actuators never receive motion.

use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::LockBinding;
use crate::error::{Error, MotionError, Result};

use super::proportions::MixRow;
use super::MAX_LOCKS;

/// Sink for actuator lock state (the stepper core's per-axis lock calls).
pub trait AxisLocks {
    /// Engage (`true`) or release (`false`) the lock on `actuator`.
    fn set_lock(&mut self, actuator: u8, locked: bool) -> Result<()>;
}

impl<L: AxisLocks + ?Sized> AxisLocks for &mut L {
    fn set_lock(&mut self, actuator: u8, locked: bool) -> Result<()> {
        (**self).set_lock(actuator, locked)
    }
}

/// Lock state as a bitmask, one bit per actuator.
///
/// Doubles as a lock sink for step code that gates its own pulses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockMask(u8);

impl LockMask {
    /// No actuator locked.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Whether `actuator` is locked.
    #[inline]
    pub fn is_locked(&self, actuator: u8) -> bool {
        actuator < 8 && self.0 & (1 << actuator) != 0
    }

    /// Raw bits.
    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }

    #[inline]
    fn set(&mut self, actuator: u8, locked: bool) {
        if actuator >= 8 {
            return;
        }
        if locked {
            self.0 |= 1 << actuator;
        } else {
            self.0 &= !(1 << actuator);
        }
    }
}

impl AxisLocks for LockMask {
    fn set_lock(&mut self, actuator: u8, locked: bool) -> Result<()> {
        self.set(actuator, locked);
        Ok(())
    }
}

/// Lock sink driving one output pin per actuator.
pub struct PinLocks<P: OutputPin> {
    pins: Vec<(P, bool), MAX_LOCKS>,
    state: LockMask,
}

impl<P: OutputPin> Default for PinLocks<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> PinLocks<P> {
    /// Create an empty pin set.
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            state: LockMask::new(),
        }
    }

    /// Add the pin for the next actuator index.
    ///
    /// With `invert`, a locked actuator drives the pin low.
    pub fn add_pin(mut self, pin: P, invert: bool) -> Result<Self> {
        self.pins
            .push((pin, invert))
            .map_err(|_| Error::Config(crate::error::ConfigError::TooManyLocks(MAX_LOCKS + 1)))?;
        Ok(self)
    }

    /// Pair `pins` with `bindings` in actuator order, taking each output's polarity
    /// from its binding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TooManyLocks` if more than four pins are given.
    pub fn from_bindings<I>(pins: I, bindings: &[LockBinding]) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        pins.into_iter()
            .zip(bindings)
            .try_fold(Self::new(), |locks, (pin, binding)| {
                locks.add_pin(pin, binding.invert)
            })
    }

    /// Last lock state written.
    pub fn state(&self) -> LockMask {
        self.state
    }

    /// Release the pins.
    pub fn release(self) -> Vec<(P, bool), MAX_LOCKS> {
        self.pins
    }
}

impl<P: OutputPin> AxisLocks for PinLocks<P> {
    fn set_lock(&mut self, actuator: u8, locked: bool) -> Result<()> {
        let (pin, invert) = self
            .pins
            .get_mut(actuator as usize)
            .ok_or(Error::Motion(MotionError::PinError))?;

        if locked != *invert {
            pin.set_high().map_err(|_| MotionError::PinError)?;
        } else {
            pin.set_low().map_err(|_| MotionError::PinError)?;
        }

        self.state.set(actuator, locked);
        Ok(())
    }
}

/// Derives lock state from the active row.
#[derive(Debug, Clone, Default)]
pub struct LockCoordinator {
    bindings: Vec<LockBinding, MAX_LOCKS>,
}

impl LockCoordinator {
    /// Create a coordinator over the given bindings.
    pub fn new(bindings: &[LockBinding]) -> Self {
        let mut list = Vec::new();
        for binding in bindings.iter().take(MAX_LOCKS) {
            let _ = list.push(*binding);
        }
        Self { bindings: list }
    }

    /// Bindings in actuator order.
    pub fn bindings(&self) -> &[LockBinding] {
        &self.bindings
    }

    /// Lock state implied by `row`.
    pub fn expected(&self, row: &MixRow) -> LockMask {
        let mut mask = LockMask::new();
        for binding in &self.bindings {
            mask.set(binding.actuator, row.weight(binding.channel) == 0);
        }
        mask
    }

    /// Push the lock state implied by `row` to `sink`, every binding.
    pub fn apply<L: AxisLocks>(&self, row: &MixRow, sink: &mut L) -> Result<()> {
        for binding in &self.bindings {
            sink.set_lock(binding.actuator, row.weight(binding.channel) == 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::COLOR_A_MASK;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    fn bindings() -> [LockBinding; 2] {
        [
            LockBinding { actuator: 0, channel: 0, invert: false },
            LockBinding { actuator: 1, channel: 1, invert: true },
        ]
    }

    #[test]
    fn test_zero_weight_locks() {
        let coordinator = LockCoordinator::new(&bindings());
        let mask = coordinator.expected(&MixRow::pure(2, 1));

        assert!(mask.is_locked(0));
        assert!(!mask.is_locked(1));
    }

    #[test]
    fn test_apply_matches_expected() {
        let coordinator = LockCoordinator::new(&bindings());
        let row = MixRow::from_weights(&[0.0, 1.0]).unwrap();
        let mut mask = LockMask::new();
        coordinator.apply(&row, &mut mask).unwrap();

        assert_eq!(mask, coordinator.expected(&row));
        assert_eq!(row.weight(1), COLOR_A_MASK);
    }

    #[test]
    fn test_pin_locks_drive_levels() {
        let z1 = PinMock::new(&[Transaction::set(State::High)]);
        let z2 = PinMock::new(&[Transaction::set(State::High)]);
        let mut z1_handle = z1.clone();
        let mut z2_handle = z2.clone();

        let mut locks = PinLocks::new()
            .add_pin(z1, false)
            .unwrap()
            .add_pin(z2, true)
            .unwrap();

        let coordinator = LockCoordinator::new(&bindings());
        // channel 0 idle: z1 locked (high), z2 unlocked (inverted, high)
        coordinator.apply(&MixRow::pure(2, 1), &mut locks).unwrap();
        assert!(locks.state().is_locked(0));
        assert!(!locks.state().is_locked(1));

        z1_handle.done();
        z2_handle.done();
    }

    #[test]
    fn test_pin_locks_polarity_from_bindings() {
        let z1 = PinMock::new(&[Transaction::set(State::High)]);
        let z2 = PinMock::new(&[Transaction::set(State::High)]);
        let mut handles = [z1.clone(), z2.clone()];

        let mut locks = PinLocks::from_bindings([z1, z2], &bindings()).unwrap();
        LockCoordinator::new(&bindings())
            .apply(&MixRow::pure(2, 1), &mut locks)
            .unwrap();
        assert_eq!(locks.state().bits(), 0b01);

        for h in handles.iter_mut() {
            h.done();
        }
    }

    #[test]
    fn test_unknown_actuator_pin() {
        let mut locks: PinLocks<PinMock> = PinLocks::new();
        assert!(locks.set_lock(0, true).is_err());
    }
}
