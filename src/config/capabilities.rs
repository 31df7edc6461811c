//! Capabilities resolved once from configuration.
//!
//! The engine never looks at TOML-shaped data; it is built from a
//! [`MixerCapabilities`] that has already been range-checked.

use heapless::Vec;

use crate::error::{ConfigError, Error, Result};
use crate::mixer::{MAX_CHANNELS, MAX_LOCKS, MAX_VIRTUAL_TOOLS, MIN_CHANNELS};

use super::validation::validate_config;
use super::SystemConfig;

/// A redundant actuator driven by the lock coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockBinding {
    /// Actuator index passed to the lock sink.
    pub actuator: u8,
    /// Channel whose weight keeps the actuator unlocked.
    pub channel: u8,
    /// Lock output is active-low.
    pub invert: bool,
}

/// Feature set and palette shape of a mixing extruder.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerCapabilities {
    channels: u8,
    virtual_tools: u8,
    presets: bool,
    retract_sync: bool,
    gradient: bool,
    gradient_alias: Option<u8>,
    locks: Vec<LockBinding, MAX_LOCKS>,
}

impl MixerCapabilities {
    /// Create capabilities for `channels` physical channels and `virtual_tools` tools.
    ///
    /// # Errors
    ///
    /// Returns an error if either count is outside the supported range.
    pub fn new(channels: u8, virtual_tools: u8) -> Result<Self> {
        if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&(channels as usize)) {
            return Err(Error::Config(ConfigError::InvalidChannelCount(channels)));
        }
        if virtual_tools == 0 || virtual_tools as usize > MAX_VIRTUAL_TOOLS {
            return Err(Error::Config(ConfigError::InvalidToolCount(virtual_tools)));
        }

        Ok(Self {
            channels,
            virtual_tools,
            presets: false,
            retract_sync: false,
            gradient: false,
            gradient_alias: None,
            locks: Vec::new(),
        })
    }

    /// Resolve capabilities from a parsed configuration.
    ///
    /// Lock bindings get actuator indices in configuration order.
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        validate_config(config)?;

        let mut caps = Self::new(config.mixer.channels, config.mixer.virtual_tools)?
            .with_presets(config.mixer.presets)
            .with_retract_sync(config.mixer.retract_sync);

        if let Some(ref gradient) = config.gradient {
            caps = caps.with_gradient(gradient.vtool_alias)?;
        }

        for (_, lock) in config.locks.iter() {
            caps = caps.with_lock_output(lock.channel, lock.invert)?;
        }

        Ok(caps)
    }

    /// Overlay preset ratios at reset.
    pub fn with_presets(mut self, enabled: bool) -> Self {
        self.presets = enabled;
        self
    }

    /// Reserve the all-channels retract tool.
    pub fn with_retract_sync(mut self, enabled: bool) -> Self {
        self.retract_sync = enabled;
        self
    }

    /// Enable the Z gradient, optionally tied to an alias tool.
    pub fn with_gradient(mut self, alias: Option<u8>) -> Result<Self> {
        if let Some(tool) = alias {
            if tool >= self.virtual_tools {
                return Err(Error::Config(ConfigError::InvalidGradientAlias(tool)));
            }
        }
        self.gradient = true;
        self.gradient_alias = alias;
        Ok(self)
    }

    /// Bind the next actuator to `channel`.
    pub fn with_lock(self, channel: u8) -> Result<Self> {
        self.with_lock_output(channel, false)
    }

    /// Bind the next actuator to `channel`, with an active-low output when `invert` is set.
    pub fn with_lock_output(mut self, channel: u8, invert: bool) -> Result<Self> {
        if channel >= self.channels {
            return Err(Error::Config(ConfigError::LockChannelOutOfRange {
                actuator: heapless::String::new(),
                channel,
            }));
        }
        let actuator = self.locks.len() as u8;
        self.locks
            .push(LockBinding {
                actuator,
                channel,
                invert,
            })
            .map_err(|_| Error::Config(ConfigError::TooManyLocks(MAX_LOCKS + 1)))?;
        Ok(self)
    }

    /// Number of physical channels.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of user-selectable virtual tools.
    #[inline]
    pub fn virtual_tools(&self) -> u8 {
        self.virtual_tools
    }

    /// Rows in the palette, including the retract sync tool if present.
    #[inline]
    pub fn tool_slots(&self) -> u8 {
        self.virtual_tools + self.retract_sync as u8
    }

    /// Whether presets are overlaid at reset.
    ///
    /// Presets only exist for two- and three-channel mixers.
    #[inline]
    pub fn presets(&self) -> bool {
        self.presets && (2..=3).contains(&self.channels)
    }

    /// Index of the retract sync tool, if reserved.
    #[inline]
    pub fn retract_sync_tool(&self) -> Option<u8> {
        self.retract_sync.then_some(self.virtual_tools)
    }

    /// Whether the Z gradient is available.
    #[inline]
    pub fn gradient(&self) -> bool {
        self.gradient
    }

    /// Tool that activates the gradient when selected.
    #[inline]
    pub fn gradient_alias(&self) -> Option<u8> {
        self.gradient_alias
    }

    /// Lock bindings in actuator order.
    #[inline]
    pub fn locks(&self) -> &[LockBinding] {
        &self.locks
    }
}
