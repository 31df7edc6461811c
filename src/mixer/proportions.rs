//! Fixed-point channel proportions.

use crate::error::{Error, MixError, Result};

use super::{COLOR_A_MASK, MAX_CHANNELS};

/// One palette row: per-channel weights in fixed point.
///
/// A normalized row has its largest weight equal to [`COLOR_A_MASK`]; the other
/// channels keep their ratio to it, rounded to the nearest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixRow {
    weights: [u8; MAX_CHANNELS],
    channels: u8,
}

impl MixRow {
    /// An all-zero row. Never stored in a palette.
    pub const fn zero(channels: u8) -> Self {
        Self {
            weights: [0; MAX_CHANNELS],
            channels,
        }
    }

    /// 100% of `channel`.
    pub fn pure(channels: u8, channel: u8) -> Self {
        let mut row = Self::zero(channels);
        if channel < channels {
            row.weights[channel as usize] = COLOR_A_MASK;
        }
        row
    }

    /// Every channel at full scale.
    pub fn full(channels: u8) -> Self {
        let mut row = Self::zero(channels);
        row.weights[..channels as usize].fill(COLOR_A_MASK);
        row
    }

    /// Scale raw weights so the largest becomes [`COLOR_A_MASK`].
    ///
    /// # Errors
    ///
    /// - `MixError::InvalidWeight` for a negative, NaN or infinite weight
    /// - `MixError::DegenerateMix` if every weight is zero
    pub fn from_weights(weights: &[f32]) -> Result<Self> {
        let channels = weights.len().min(MAX_CHANNELS);
        let mut cmax = 0.0f32;
        for &w in &weights[..channels] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Mix(MixError::InvalidWeight(w)));
            }
            cmax = cmax.max(w);
        }
        if cmax <= 0.0 {
            return Err(Error::Mix(MixError::DegenerateMix));
        }

        let scale = COLOR_A_MASK as f32 / cmax;
        let mut row = Self::zero(channels as u8);
        for (dst, &w) in row.weights.iter_mut().zip(&weights[..channels]) {
            *dst = quantize(w * scale);
        }
        Ok(row)
    }

    /// Scale percentages so the largest becomes [`COLOR_A_MASK`].
    ///
    /// # Errors
    ///
    /// Returns `MixError::DegenerateMix` if every percentage is zero.
    pub fn from_percentages(mix: &[u8]) -> Result<Self> {
        let channels = mix.len().min(MAX_CHANNELS);
        let mmax = mix[..channels].iter().copied().max().unwrap_or(0);
        if mmax == 0 {
            return Err(Error::Mix(MixError::DegenerateMix));
        }

        let scale = COLOR_A_MASK as f32 / mmax as f32;
        let mut row = Self::zero(channels as u8);
        for (dst, &pct) in row.weights.iter_mut().zip(&mix[..channels]) {
            *dst = quantize(pct as f32 * scale);
        }
        Ok(row)
    }

    /// Number of channels in this row.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Weight of one channel (0 for channels past the end).
    #[inline]
    pub fn weight(&self, channel: u8) -> u8 {
        if channel < self.channels {
            self.weights[channel as usize]
        } else {
            0
        }
    }

    /// Weights of the configured channels.
    #[inline]
    pub fn weights(&self) -> &[u8] {
        &self.weights[..self.channels as usize]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> u16 {
        self.weights().iter().map(|&w| w as u16).sum()
    }

    /// Largest weight.
    pub fn max(&self) -> u8 {
        self.weights().iter().copied().max().unwrap_or(0)
    }

    /// True if no channel carries weight.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.weights().iter().all(|&w| w == 0)
    }

    /// Per-channel share of `proportion`, in proportion to the weights.
    ///
    /// # Errors
    ///
    /// Returns `MixError::DegenerateMix` for an all-zero row.
    pub fn proportions(&self, proportion: f32) -> Result<[f32; MAX_CHANNELS]> {
        let csum = self.sum();
        if csum == 0 {
            return Err(Error::Mix(MixError::DegenerateMix));
        }

        let inv_prop = proportion / csum as f32;
        let mut out = [0.0f32; MAX_CHANNELS];
        for (dst, &w) in out.iter_mut().zip(self.weights()) {
            *dst = w as f32 * inv_prop;
        }
        Ok(out)
    }

    /// Integer percentages of each channel, summing to exactly 100.
    ///
    /// Rounding remainder goes to the largest channel.
    ///
    /// # Errors
    ///
    /// Returns `MixError::DegenerateMix` for an all-zero row.
    pub fn percentages(&self) -> Result<[u8; MAX_CHANNELS]> {
        let ctot = self.sum();
        if ctot == 0 {
            return Err(Error::Mix(MixError::DegenerateMix));
        }

        let mut mix = [0u8; MAX_CHANNELS];
        let mut total: i16 = 0;
        let mut largest = 0usize;
        for (i, &w) in self.weights().iter().enumerate() {
            let pct = libm::roundf(100.0 * w as f32 / ctot as f32) as i16;
            mix[i] = pct as u8;
            total += pct;
            if w > self.weights[largest] {
                largest = i;
            }
        }
        mix[largest] = (mix[largest] as i16 + 100 - total) as u8;
        Ok(mix)
    }
}

fn quantize(value: f32) -> u8 {
    libm::roundf(value).clamp(0.0, COLOR_A_MASK as f32) as u8
}
