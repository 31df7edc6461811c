//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::mixer::{MAX_CHANNELS, MAX_LOCKS, MAX_VIRTUAL_TOOLS, MIN_CHANNELS};

use super::mechanical::ExtruderConfig;
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Channel and virtual tool counts are in range
/// - At most four lock bindings, each on an existing channel
/// - Gradient alias names an existing tool
/// - Extruder rates are positive
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    let channels = config.mixer.channels;
    if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&(channels as usize)) {
        return Err(Error::Config(ConfigError::InvalidChannelCount(channels)));
    }

    let tools = config.mixer.virtual_tools;
    if tools == 0 || tools as usize > MAX_VIRTUAL_TOOLS {
        return Err(Error::Config(ConfigError::InvalidToolCount(tools)));
    }

    if config.locks.len() > MAX_LOCKS {
        return Err(Error::Config(ConfigError::TooManyLocks(config.locks.len())));
    }

    for (name, lock) in config.locks.iter() {
        if lock.channel >= channels {
            return Err(Error::Config(ConfigError::LockChannelOutOfRange {
                actuator: name.clone(),
                channel: lock.channel,
            }));
        }
    }

    if let Some(alias) = config.gradient.as_ref().and_then(|g| g.vtool_alias) {
        if alias >= tools {
            return Err(Error::Config(ConfigError::InvalidGradientAlias(alias)));
        }
    }

    if let Some(ref extruder) = config.extruder {
        validate_extruder(extruder)?;
    }

    Ok(())
}

fn validate_extruder(config: &ExtruderConfig) -> Result<()> {
    if !is_positive(config.steps_per_mm) {
        return Err(Error::Config(ConfigError::InvalidStepsPerMm(config.steps_per_mm)));
    }

    if !is_positive(config.max_velocity.0) {
        return Err(Error::Config(ConfigError::InvalidMaxVelocity(
            config.max_velocity.0,
        )));
    }

    if !is_positive(config.max_acceleration.0) {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(
            config.max_acceleration.0,
        )));
    }

    Ok(())
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
