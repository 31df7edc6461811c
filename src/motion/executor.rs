//! Walks a profile one step at a time.

use super::profile::{MotionPhase, MotionProfile};

/// Runtime state while a block's profile is executed.
#[derive(Debug, Clone)]
pub struct MotionExecutor {
    profile: MotionProfile,
    /// Steps already emitted.
    current_step: u32,
    phase: MotionPhase,
}

impl MotionExecutor {
    /// Create a new executor for a motion profile.
    pub fn new(profile: MotionProfile) -> Self {
        let phase = profile.phase_at(0);
        Self {
            profile,
            current_step: 0,
            phase,
        }
    }

    /// Check if motion is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.phase == MotionPhase::Complete
    }

    /// Steps already emitted.
    #[inline]
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Get the total number of steps.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.profile.total_steps
    }

    /// Get steps remaining.
    #[inline]
    pub fn steps_remaining(&self) -> u32 {
        self.profile.total_steps.saturating_sub(self.current_step)
    }

    /// Phase of the next step.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Get the motion profile.
    #[inline]
    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Interval to wait before the next step, or `None` once the profile is done.
    ///
    /// Advances past that step.
    pub fn next_interval(&mut self) -> Option<u32> {
        if self.is_complete() {
            return None;
        }

        let interval = self.profile.interval_at(self.current_step);
        self.current_step += 1;
        self.phase = self.profile.phase_at(self.current_step);
        Some(interval)
    }

    /// Restart from the first step.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.phase = self.profile.phase_at(0);
    }

    /// Get progress as a fraction (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.profile.total_steps == 0 {
            1.0
        } else {
            self.current_step as f32 / self.profile.total_steps as f32
        }
    }
}

impl Iterator for MotionExecutor {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.next_interval()
    }
}
