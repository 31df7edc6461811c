//! Per-step channel selection for the step interrupt.
//!
//! Each logical extruder step goes to exactly one channel. Channels are visited
//! round-robin; a visit adds the channel's weight to its accumulator and the
//! channel steps once the accumulator reaches [`COLOR_A_MASK`]. Over a block the
//! step counts converge on the row's ratios, like a multi-channel Bresenham.

use super::proportions::MixRow;
use super::{COLOR_A_MASK, COLOR_MASK, MAX_CHANNELS};

/// Runner state owned by the step-emission path.
#[derive(Debug, Clone, Default)]
pub struct RunnerState {
    runner: u8,
    channels: u8,
    s_color: [u8; MAX_CHANNELS],
    accu: [u8; MAX_CHANNELS],
}

impl RunnerState {
    /// Create an idle runner.
    pub const fn new() -> Self {
        Self {
            runner: 0,
            channels: 0,
            s_color: [0; MAX_CHANNELS],
            accu: [0; MAX_CHANNELS],
        }
    }

    /// Load the row a block was planned with.
    ///
    /// Accumulators carry over between blocks so fractional steps are not lost;
    /// they are cleared only when the channel count changes.
    pub fn setup(&mut self, color: &MixRow) {
        let channels = color.channels();
        if channels != self.channels {
            self.accu = [0; MAX_CHANNELS];
            self.runner = 0;
            self.channels = channels;
        }
        self.s_color = [0; MAX_CHANNELS];
        self.s_color[..channels as usize].copy_from_slice(color.weights());
    }

    /// Channel that takes the next step, or `None` if the loaded row is empty.
    pub fn next_channel(&mut self) -> Option<u8> {
        let n = self.channels as usize;
        if n == 0 || self.s_color[..n].iter().all(|&c| c == 0) {
            return None;
        }

        loop {
            self.runner = if self.runner == 0 {
                self.channels - 1
            } else {
                self.runner - 1
            };
            let r = self.runner as usize;
            self.accu[r] = self.accu[r].wrapping_add(self.s_color[r]);
            if self.accu[r] & COLOR_A_MASK != 0 {
                self.accu[r] &= COLOR_MASK;
                return Some(self.runner);
            }
        }
    }

    /// Clear accumulators and the loaded row.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Accumulator of one channel.
    #[inline]
    pub fn accumulator(&self, channel: u8) -> u8 {
        self.accu.get(channel as usize).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_steps(runner: &mut RunnerState, steps: usize) -> [u32; MAX_CHANNELS] {
        let mut counts = [0u32; MAX_CHANNELS];
        for _ in 0..steps {
            let ch = runner.next_channel().unwrap();
            counts[ch as usize] += 1;
        }
        counts
    }

    #[test]
    fn test_even_mix_alternates() {
        let mut runner = RunnerState::new();
        runner.setup(&MixRow::from_weights(&[1.0, 1.0]).unwrap());

        assert_eq!(runner.next_channel(), Some(1));
        assert_eq!(runner.next_channel(), Some(0));
        assert_eq!(runner.next_channel(), Some(1));
        assert_eq!(runner.next_channel(), Some(0));
    }

    #[test]
    fn test_ratio_is_exact_over_full_cycle() {
        let mut runner = RunnerState::new();
        let row = MixRow::from_weights(&[1.0, 3.0]).unwrap();
        assert_eq!(row.weights(), &[43, 128]);
        runner.setup(&row);

        // 128 visits per channel: 43 steps on channel 0, 128 on channel 1
        let counts = count_steps(&mut runner, 171);
        assert_eq!(&counts[..2], &[43, 128]);
        assert_eq!(runner.accumulator(0), 0);
    }

    #[test]
    fn test_zero_channel_never_steps() {
        let mut runner = RunnerState::new();
        runner.setup(&MixRow::from_weights(&[1.0, 0.0, 1.0]).unwrap());

        let counts = count_steps(&mut runner, 100);
        assert_eq!(counts[1], 0);
        assert_eq!(counts[0] + counts[2], 100);
    }

    #[test]
    fn test_empty_row_yields_none() {
        let mut runner = RunnerState::new();
        runner.setup(&MixRow::zero(2));
        assert_eq!(runner.next_channel(), None);

        runner.reset();
        assert_eq!(runner.next_channel(), None);
    }

    #[test]
    fn test_accumulators_carry_between_blocks() {
        let mut runner = RunnerState::new();
        runner.setup(&MixRow::from_weights(&[1.0, 3.0]).unwrap());
        count_steps(&mut runner, 5);
        let carried = runner.accumulator(0);

        runner.setup(&MixRow::from_weights(&[3.0, 1.0]).unwrap());
        assert_eq!(runner.accumulator(0), carried);
    }
}
