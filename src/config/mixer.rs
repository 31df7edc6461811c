//! Mixer, gradient and lock sections of the configuration.

use serde::Deserialize;

/// `[mixer]` section: palette shape and optional tool overlays.
#[derive(Debug, Clone, Deserialize)]
pub struct MixerConfig {
    /// Number of physical filament channels (2-6).
    pub channels: u8,

    /// Number of selectable virtual tools (1-16).
    pub virtual_tools: u8,

    /// Overlay the preset ratios on the palette at reset (2 or 3 channels only).
    #[serde(default)]
    pub presets: bool,

    /// Reserve an extra all-channels tool used while retracting.
    #[serde(default)]
    pub retract_sync: bool,
}

/// `[gradient]` section. Its presence enables the Z gradient capability.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradientConfig {
    /// Virtual tool that activates the gradient when selected.
    ///
    /// Without an alias the gradient applies whatever tool is selected.
    #[serde(default)]
    pub vtool_alias: Option<u8>,
}

/// One `[locks.<actuator>]` entry binding a redundant actuator to a channel.
#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    /// Channel whose weight keeps this actuator unlocked.
    pub channel: u8,

    /// Lock output is active-low.
    #[serde(default)]
    pub invert: bool,
}
