//! Engine shared between the command loop and interrupt-side code.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::{Error, MixError, Result};

use super::engine::MixingEngine;
use super::locks::AxisLocks;
use super::proportions::MixRow;

/// A [`MixingEngine`] behind a critical-section mutex.
///
/// Can live in a `static`: construct empty with [`new`](Self::new) and
/// [`install`](Self::install) the engine at startup. Every access runs with
/// interrupts masked, so a row is never observed half-written.
pub struct SharedMixer<L: AxisLocks> {
    inner: Mutex<RefCell<Option<MixingEngine<L>>>>,
}

impl<L: AxisLocks> Default for SharedMixer<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: AxisLocks> SharedMixer<L> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Place an engine in the slot, returning the previous one.
    pub fn install(&self, engine: MixingEngine<L>) -> Option<MixingEngine<L>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(engine))
    }

    /// Take the engine out of the slot.
    pub fn take(&self) -> Option<MixingEngine<L>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the engine inside a critical section.
    ///
    /// Returns `None` if no engine is installed.
    pub fn lock<R>(&self, f: impl FnOnce(&mut MixingEngine<L>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Row new blocks should carry.
    ///
    /// # Errors
    ///
    /// Returns `MixError::EngineUnavailable` if no engine is installed.
    pub fn current_row(&self) -> Result<MixRow> {
        self.lock(|engine| engine.current_row())
            .ok_or(Error::Mix(MixError::EngineUnavailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MixerCapabilities;
    use crate::mixer::{LockMask, COLOR_A_MASK};

    static MIXER: SharedMixer<LockMask> = SharedMixer::new();

    #[test]
    fn test_shared_access() {
        assert!(MIXER.current_row().is_err());

        let caps = MixerCapabilities::new(2, 4).unwrap().with_lock(1).unwrap();
        MIXER.install(MixingEngine::new(caps, LockMask::new()).unwrap());

        MIXER.lock(|engine| engine.select_tool(1)).unwrap().unwrap();
        assert_eq!(MIXER.current_row().unwrap().weights(), &[0, COLOR_A_MASK]);

        let engine = MIXER.take().unwrap();
        assert!(!engine.lock_sink().is_locked(0));
        assert!(MIXER.lock(|e| e.selected_tool()).is_none());
    }
}
