//! Unit tests for configuration validation.

use mixing_extruder::config::{validate_config, SystemConfig};
use mixing_extruder::error::{ConfigError, Error};

fn parse(toml_str: &str) -> SystemConfig {
    toml::from_str(toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = parse(
        r#"
[mixer]
channels = 3
virtual_tools = 16
presets = true
retract_sync = true

[gradient]
vtool_alias = 15

[locks.z1]
channel = 0
[locks.z2]
channel = 1
[locks.z3]
channel = 2

[extruder]
steps_per_mm = 415.0
max_velocity_mm_per_sec = 40.0
max_acceleration_mm_per_sec2 = 5000.0
"#,
    );
    assert!(validate_config(&config).is_ok());
}

/// Test channel count bounds.
#[test]
fn test_channel_count_out_of_range() {
    for channels in [0u8, 1, 7] {
        let config = parse(&format!(
            "[mixer]\nchannels = {}\nvirtual_tools = 4\n",
            channels
        ));
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidChannelCount(channels)))
        );
    }
}

/// Test virtual tool count bounds.
#[test]
fn test_tool_count_out_of_range() {
    for tools in [0u8, 17] {
        let config = parse(&format!("[mixer]\nchannels = 2\nvirtual_tools = {}\n", tools));
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidToolCount(tools)))
        );
    }
}

/// Test validation fails for a lock on a channel the mixer lacks.
#[test]
fn test_lock_channel_out_of_range() {
    let config = parse(
        r#"
[mixer]
channels = 2
virtual_tools = 4

[locks.z3]
channel = 2
"#,
    );
    match validate_config(&config) {
        Err(Error::Config(ConfigError::LockChannelOutOfRange { actuator, channel })) => {
            assert_eq!(actuator.as_str(), "z3");
            assert_eq!(channel, 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Test at most four lock bindings are accepted.
#[test]
fn test_too_many_locks() {
    let config = parse(
        r#"
[mixer]
channels = 2
virtual_tools = 4

[locks.a]
channel = 0
[locks.b]
channel = 1
[locks.c]
channel = 0
[locks.d]
channel = 1
[locks.e]
channel = 0
"#,
    );
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::TooManyLocks(5)))
    );
}

/// Test the gradient alias must name an existing tool.
#[test]
fn test_gradient_alias_out_of_range() {
    let config = parse(
        r#"
[mixer]
channels = 2
virtual_tools = 4

[gradient]
vtool_alias = 4
"#,
    );
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGradientAlias(4)))
    );
}

/// Test extruder rates must be positive.
#[test]
fn test_extruder_rates_positive() {
    let config = parse(
        r#"
[mixer]
channels = 2
virtual_tools = 4

[extruder]
steps_per_mm = 93.0
max_velocity_mm_per_sec = 0.0
max_acceleration_mm_per_sec2 = 1000.0
"#,
    );
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxVelocity(_)))
    ));
}
