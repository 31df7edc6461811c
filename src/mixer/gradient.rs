//! Z gradient: blend between two tools' mixes across a height window.

use super::proportions::MixRow;
use super::MAX_CHANNELS;

/// Partial gradient update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradientSettings {
    /// Height where the start mix applies.
    pub start_z: Option<f32>,
    /// Height where the end mix applies.
    pub end_z: Option<f32>,
    /// Tool supplying the start mix.
    pub start_vtool: Option<u8>,
    /// Tool supplying the end mix.
    pub end_vtool: Option<u8>,
    /// Arm (`true`) or disarm (`false`) the gradient.
    pub armed: Option<bool>,
    /// Set (`Some(Some(t))`) or clear (`Some(None)`) the alias tool.
    pub alias: Option<Option<u8>>,
}

/// Gradient parameters and the interpolated row for the current Z.
#[derive(Debug, Clone)]
pub struct GradientState {
    channels: u8,
    armed: bool,
    enabled: bool,
    start_z: f32,
    end_z: f32,
    start_vtool: u8,
    end_vtool: u8,
    alias: Option<u8>,
    start_mix: [u8; MAX_CHANNELS],
    end_mix: [u8; MAX_CHANNELS],
    mix: [u8; MAX_CHANNELS],
    color: MixRow,
    prev_z: Option<f32>,
}

impl GradientState {
    /// Create a disabled gradient from tool 0 to tool 1.
    pub fn new(channels: u8, alias: Option<u8>) -> Self {
        Self {
            channels,
            armed: true,
            enabled: false,
            start_z: 0.0,
            end_z: 0.0,
            start_vtool: 0,
            end_vtool: 1,
            alias,
            start_mix: [0; MAX_CHANNELS],
            end_mix: [0; MAX_CHANNELS],
            mix: [0; MAX_CHANNELS],
            color: MixRow::zero(channels),
            prev_z: None,
        }
    }

    /// Whether blocks currently take their row from the gradient.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the gradient is armed (it still needs a valid window to be enabled).
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Height where the start mix applies.
    #[inline]
    pub fn start_z(&self) -> f32 {
        self.start_z
    }

    /// Height where the end mix applies.
    #[inline]
    pub fn end_z(&self) -> f32 {
        self.end_z
    }

    /// Tool supplying the start mix.
    #[inline]
    pub fn start_vtool(&self) -> u8 {
        self.start_vtool
    }

    /// Tool supplying the end mix.
    #[inline]
    pub fn end_vtool(&self) -> u8 {
        self.end_vtool
    }

    /// Alias tool, if any.
    #[inline]
    pub fn alias(&self) -> Option<u8> {
        self.alias
    }

    /// Start mix in percent.
    #[inline]
    pub fn start_mix(&self) -> &[u8] {
        &self.start_mix[..self.channels as usize]
    }

    /// End mix in percent.
    #[inline]
    pub fn end_mix(&self) -> &[u8] {
        &self.end_mix[..self.channels as usize]
    }

    /// Mix in percent at the last computed Z.
    #[inline]
    pub fn mix(&self) -> &[u8] {
        &self.mix[..self.channels as usize]
    }

    /// Row at the last computed Z.
    #[inline]
    pub fn color(&self) -> &MixRow {
        &self.color
    }

    /// Height the row was last computed for.
    #[inline]
    pub fn current_z(&self) -> Option<f32> {
        self.prev_z
    }

    pub(crate) fn apply(&mut self, settings: &GradientSettings) {
        if let Some(z) = settings.start_z {
            self.start_z = z;
        }
        if let Some(z) = settings.end_z {
            self.end_z = z;
        }
        if let Some(t) = settings.start_vtool {
            self.start_vtool = t;
        }
        if let Some(t) = settings.end_vtool {
            self.end_vtool = t;
        }
        if let Some(armed) = settings.armed {
            self.armed = armed;
        }
        if let Some(alias) = settings.alias {
            self.alias = alias;
        }
    }

    /// Whether the window and tools describe a usable gradient for `selected`.
    pub(crate) fn is_usable(&self, selected: u8) -> bool {
        let alias_ok = self.alias.map_or(true, |a| a == selected);
        self.armed && alias_ok && self.start_vtool != self.end_vtool && self.start_z < self.end_z
    }

    pub(crate) fn activate(&mut self, start_mix: [u8; MAX_CHANNELS], end_mix: [u8; MAX_CHANNELS]) {
        self.start_mix = start_mix;
        self.end_mix = end_mix;
        self.enabled = true;
        self.prev_z = None;
    }

    pub(crate) fn deactivate(&mut self) {
        self.enabled = false;
        self.prev_z = None;
    }

    /// Interpolated percentages at `z`, clamped to the window ends.
    pub fn mix_at(&self, z: f32) -> [u8; MAX_CHANNELS] {
        let slice = self.end_z - self.start_z;
        let pct = if slice > 0.0 {
            ((z - self.start_z) / slice).clamp(0.0, 1.0)
        } else if z >= self.end_z {
            1.0
        } else {
            0.0
        };

        let mut mix = [0u8; MAX_CHANNELS];
        for i in 0..self.channels as usize {
            let sm = self.start_mix[i] as f32;
            let em = self.end_mix[i] as f32;
            mix[i] = libm::roundf(sm + (em - sm) * pct) as u8;
        }
        mix
    }

    /// Recompute the row for `z`. Skipped when `z` equals the last height.
    ///
    /// Returns `true` if the row was recomputed.
    pub fn update_for_z(&mut self, z: f32) -> bool {
        if self.prev_z == Some(z) {
            return false;
        }
        self.prev_z = Some(z);

        self.mix = self.mix_at(z);
        // Interpolating two valid mixes never yields all zero; keep the last row if it would.
        if let Ok(row) = MixRow::from_percentages(&self.mix[..self.channels as usize]) {
            self.color = row;
        }
        true
    }
}
