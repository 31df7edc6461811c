//! Configuration module for mixing-extruder.
//!
//! Provides types for loading and validating the mixer palette, lock bindings,
//! gradient capability and extruder drive from TOML files (with `std` feature)
//! or pre-parsed data.

mod capabilities;
mod mechanical;
mod mixer;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use capabilities::{LockBinding, MixerCapabilities};
pub use mechanical::{ExtruderConfig, MechanicalConstraints};
pub use mixer::{GradientConfig, LockConfig, MixerConfig};
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Millimeters, MillimetersPerSec, MillimetersPerSecSquared, Steps};
