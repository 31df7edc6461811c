//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use mixing_extruder::load_config;
///
/// let config = load_config("mixer.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(truncate(e.message(), 128)).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

// Cut at a char boundary so the message fits a fixed-capacity string.
fn truncate(msg: &str, max: usize) -> &str {
    if msg.len() <= max {
        return msg;
    }
    let mut end = max;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[mixer]
channels = 2
virtual_tools = 4
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.mixer.channels, 2);
        assert!(!config.mixer.presets);
        assert!(!config.has_gradient());
        assert!(config.locks.is_empty());
    }

    #[test]
    fn test_parse_with_locks_and_gradient() {
        let toml = r#"
[mixer]
channels = 3
virtual_tools = 8
presets = true

[gradient]
vtool_alias = 5

[locks.z1]
channel = 0

[locks.z2]
channel = 1
invert = true
"#;

        let config = parse_config(toml).unwrap();
        let names: Vec<_> = config.lock_names().collect();
        assert_eq!(names, ["z1", "z2"]);
        assert!(config.lock("z2").unwrap().invert);
        assert_eq!(config.gradient.unwrap().vtool_alias, Some(5));
    }

    #[test]
    fn test_parse_rejects_invalid_alias() {
        let toml = r#"
[mixer]
channels = 2
virtual_tools = 4

[gradient]
vtool_alias = 4
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::InvalidGradientAlias(4)))
        ));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            parse_config("[mixer]\nchannels = \"two\""),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_truncate_long_message() {
        let msg = "é".repeat(100);
        assert!(truncate(&msg, 128).len() <= 128);
    }
}
