//! Multi-channel extruder stepper driver.
//!
//! Generic over embedded-hal 1.0 pin types.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::units::Steps;
use crate::config::MechanicalConstraints;
use crate::error::{ConfigError, Error, MotionError, Result};
use crate::mixer::{RunnerState, MAX_CHANNELS};
use crate::motion::{Direction, MotionExecutor, MotionPhase, MotionProfile};
use crate::planner::{BlockConsumer, MixBlock};

/// STEP/DIR pair of one channel and its position.
struct Channel<STEP, DIR> {
    step_pin: STEP,
    dir_pin: DIR,
    position: Steps,
}

/// Drives every channel of a mixing extruder from queued blocks.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider (must implement `DelayNs`)
pub struct MixingStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    channels: Vec<Channel<STEP, DIR>, MAX_CHANNELS>,

    /// Delay provider for step timing.
    delay: DELAY,

    constraints: MechanicalConstraints,

    runner: RunnerState,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Executor for the loaded block, if any.
    executor: Option<MotionExecutor>,
}

impl<STEP, DIR, DELAY> MixingStepper<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver with no channels.
    pub fn new(delay: DELAY, constraints: MechanicalConstraints) -> Self {
        Self {
            channels: Vec::new(),
            delay,
            constraints,
            runner: RunnerState::new(),
            current_direction: None,
            executor: None,
        }
    }

    /// Add the pins of the next channel.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidChannelCount` past the supported channel count.
    pub fn add_channel(mut self, step_pin: STEP, dir_pin: DIR) -> Result<Self> {
        self.channels
            .push(Channel {
                step_pin,
                dir_pin,
                position: Steps::default(),
            })
            .map_err(|_| Error::Config(ConfigError::InvalidChannelCount(MAX_CHANNELS as u8 + 1)))?;
        Ok(self)
    }

    /// Number of channels driven.
    #[inline]
    pub fn channel_count(&self) -> u8 {
        self.channels.len() as u8
    }

    /// Position of one channel.
    #[inline]
    pub fn position(&self, channel: u8) -> Option<Steps> {
        self.channels.get(channel as usize).map(|c| c.position)
    }

    /// Sum of every channel's position, i.e. logical extruder steps.
    pub fn total_position(&self) -> Steps {
        Steps(self.channels.iter().map(|c| c.position.0).sum())
    }

    /// Zero every channel position.
    pub fn set_origin(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.position = Steps::default();
        }
    }

    /// Get the mechanical constraints.
    #[inline]
    pub fn constraints(&self) -> &MechanicalConstraints {
        &self.constraints
    }

    /// Runner state used for channel selection.
    #[inline]
    pub fn runner(&self) -> &RunnerState {
        &self.runner
    }

    /// True if no block is loaded.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.executor.is_none()
    }

    /// Phase of the loaded block.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.executor
            .as_ref()
            .map(|e| e.phase())
            .unwrap_or(MotionPhase::Complete)
    }

    /// Load a block: set direction pins, runner row and motion profile.
    ///
    /// # Errors
    ///
    /// - `MotionError::ChannelMismatch` if the block's row has a different channel count
    /// - `MotionError::EmptyBlock` if the row gives every channel zero weight
    /// - `MotionError::PinError` if a direction pin fails
    pub fn load(&mut self, block: &MixBlock) -> Result<()> {
        let channels = self.channel_count();
        if block.color.channels() != channels {
            return Err(Error::Motion(MotionError::ChannelMismatch {
                block: block.color.channels(),
                stepper: channels,
            }));
        }
        if block.color.is_zero() {
            return Err(Error::Motion(MotionError::EmptyBlock));
        }

        self.set_direction(block.direction)?;
        self.runner.setup(&block.color);

        let profile = MotionProfile::for_extruder(block.steps, block.direction, &self.constraints);
        self.executor = Some(MotionExecutor::new(profile));
        trace!("loaded block: {} steps", block.steps);
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Extrude => !self.constraints.invert_direction,
            Direction::Retract => self.constraints.invert_direction,
        };

        for channel in self.channels.iter_mut() {
            if pin_high {
                channel.dir_pin.set_high().map_err(|_| MotionError::PinError)?;
            } else {
                channel.dir_pin.set_low().map_err(|_| MotionError::PinError)?;
            }
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    /// Wait out the next interval and pulse the channel the runner picks.
    ///
    /// Returns `true` once the loaded block is complete.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::NoActiveBlock` if nothing is loaded.
    pub fn step(&mut self) -> Result<bool> {
        let executor = self
            .executor
            .as_mut()
            .ok_or(Error::Motion(MotionError::NoActiveBlock))?;

        let Some(interval_ns) = executor.next_interval() else {
            self.executor = None;
            return Ok(true);
        };
        let done = executor.is_complete();
        let sign = executor.profile().direction.sign();

        let pulse_ns = self.constraints.pulse_width_ns;
        self.delay.delay_ns(interval_ns.saturating_sub(pulse_ns));

        let index = self
            .runner
            .next_channel()
            .ok_or(Error::Motion(MotionError::EmptyBlock))?;
        let channel = &mut self.channels[index as usize];

        channel.step_pin.set_high().map_err(|_| MotionError::PinError)?;
        self.delay.delay_ns(pulse_ns);
        channel.step_pin.set_low().map_err(|_| MotionError::PinError)?;
        channel.position = Steps(channel.position.0 + sign);

        if done {
            self.executor = None;
        }
        Ok(done)
    }

    /// Load `block` and step it to completion (blocking).
    pub fn run_block(&mut self, block: &MixBlock) -> Result<()> {
        self.load(block)?;
        while !self.step()? {}
        Ok(())
    }

    /// Step-interrupt body: load the next queued block when idle, then emit one step.
    ///
    /// Returns `false` when idle with nothing queued.
    pub fn poll<const N: usize>(&mut self, consumer: &mut BlockConsumer<'_, N>) -> Result<bool> {
        while self.executor.is_none() {
            let Some(block) = consumer.pop() else {
                return Ok(false);
            };
            if block.is_empty() {
                continue;
            }
            self.load(&block)?;
        }
        self.step()?;
        Ok(true)
    }
}
