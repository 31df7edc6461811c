//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::mechanical::ExtruderConfig;
use super::mixer::{GradientConfig, LockConfig, MixerConfig};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Palette shape.
    pub mixer: MixerConfig,

    /// Z gradient capability (absent = disabled).
    #[serde(default)]
    pub gradient: Option<GradientConfig>,

    /// Named lock bindings, in actuator order.
    #[serde(default)]
    pub locks: FnvIndexMap<String<32>, LockConfig, 8>,

    /// Channel stepper drive parameters.
    #[serde(default)]
    pub extruder: Option<ExtruderConfig>,
}

impl SystemConfig {
    /// Get a lock binding by actuator name.
    pub fn lock(&self, name: &str) -> Option<&LockConfig> {
        self.locks
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all lock actuator names in actuator order.
    pub fn lock_names(&self) -> impl Iterator<Item = &str> {
        self.locks.keys().map(|s| s.as_str())
    }

    /// Whether the gradient capability is configured.
    pub fn has_gradient(&self) -> bool {
        self.gradient.is_some()
    }
}
