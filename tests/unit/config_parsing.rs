//! Unit tests for TOML configuration parsing.

use mixing_extruder::config::{parse_config, MixerCapabilities, SystemConfig};
use mixing_extruder::error::{ConfigError, Error};

/// Test parsing the palette section alone.
#[test]
fn test_parse_minimal_mixer() {
    let toml_str = r#"
[mixer]
channels = 2
virtual_tools = 4
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.mixer.channels, 2);
    assert_eq!(config.mixer.virtual_tools, 4);
    assert!(!config.mixer.presets);
    assert!(!config.mixer.retract_sync);
    assert!(!config.has_gradient());
    assert!(config.locks.is_empty());
    assert!(config.extruder.is_none());
}

/// Test lock bindings keep their declaration order.
#[test]
fn test_parse_locks_in_order() {
    let toml_str = r#"
[mixer]
channels = 3
virtual_tools = 8

[locks.z_right]
channel = 2

[locks.z_left]
channel = 0
invert = true
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let names: Vec<&str> = config.lock_names().collect();
    assert_eq!(names, vec!["z_right", "z_left"]);
    assert!(config.lock("z_left").unwrap().invert);

    let caps = MixerCapabilities::from_config(&config).unwrap();
    assert_eq!(caps.locks()[0].channel, 2);
    assert_eq!(caps.locks()[1].actuator, 1);
}

/// Test the gradient section with and without an alias.
#[test]
fn test_parse_gradient_section() {
    let with_alias = r#"
[mixer]
channels = 2
virtual_tools = 8

[gradient]
vtool_alias = 7
"#;
    let config = parse_config(with_alias).unwrap();
    assert_eq!(config.gradient.as_ref().unwrap().vtool_alias, Some(7));

    let without_alias = r#"
[mixer]
channels = 2
virtual_tools = 8

[gradient]
"#;
    let config = parse_config(without_alias).unwrap();
    let caps = MixerCapabilities::from_config(&config).unwrap();
    assert!(caps.gradient());
    assert_eq!(caps.gradient_alias(), None);
}

/// Test parsing the extruder drive section with its unit-suffixed keys.
#[test]
fn test_parse_extruder() {
    let toml_str = r#"
[mixer]
channels = 2
virtual_tools = 2

[extruder]
steps_per_mm = 93.0
max_velocity_mm_per_sec = 25.0
max_acceleration_mm_per_sec2 = 1000.0
invert_direction = true
"#;

    let config = parse_config(toml_str).unwrap();
    let extruder = config.extruder.unwrap();
    assert_eq!(extruder.steps_per_mm, 93.0);
    assert_eq!(extruder.max_velocity.0, 25.0);
    assert_eq!(extruder.max_acceleration.0, 1000.0);
    assert!(extruder.invert_direction);
    assert_eq!(extruder.pulse_width_us, 2);
}

/// Test malformed TOML reports a parse error.
#[test]
fn test_parse_error_reported() {
    let result = parse_config("[mixer\nchannels = 2");
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test loading a file that does not exist reports an I/O error.
#[test]
fn test_load_missing_file() {
    let result = mixing_extruder::load_config("/nonexistent/mixer.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}
