//! Per-zone recoloring: color shift, brightness, contrast around the mean.
//!
//! # Formula
//! For each channel `c` with `factor = percent[c] / 100`:
//! ```text
//!   delta      = (255 − v) × max(factor, 0) + v × min(factor, 0)
//!   bright     = (v + delta) × brightness
//!   contrasted = clamp((bright − mean[c]) × contrast + mean[c], 0, 255)
//! ```
//! `mean[c]` is taken over every pixel of the brightened zone image, so the
//! whole image must be shifted before any pixel can be contrasted.
//!
//! ```text
//!   Input ──→ +Delta ──→ ×Brightness ──→ mean ──→ ×Contrast about mean ──→ clamp
//! ```

use glam::{DVec3, Vec3};

use crate::params::ZoneAdjustment;

/// Upper bound of the 8-bit sample scale.
pub const WHITE: f32 = 255.0;

/// One zone's adjustment, pre-split into the form the pixel loops want.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRecolor {
    toward_white: Vec3,
    toward_black: Vec3,
    brightness: f32,
    contrast: f32,
}

impl ZoneRecolor {
    pub fn new(adj: &ZoneAdjustment) -> Self {
        let factors = adj.color_factors();
        Self {
            toward_white: factors.max(Vec3::ZERO),
            toward_black: factors.min(Vec3::ZERO),
            brightness: adj.brightness,
            contrast: adj.contrast,
        }
    }

    /// Color shift followed by the brightness multiply.
    ///
    /// Only one of the two shift terms is non-zero per channel, picked by the
    /// sign of that channel's factor.
    #[inline]
    pub fn shift(&self, v: Vec3) -> Vec3 {
        let delta = (Vec3::splat(WHITE) - v) * self.toward_white + v * self.toward_black;
        (v + delta) * self.brightness
    }

    /// Contrast about `mean`, clamped to the sample range.
    #[inline]
    pub fn contrast(&self, bright: Vec3, mean: Vec3) -> Vec3 {
        ((bright - mean) * self.contrast + mean).clamp(Vec3::ZERO, Vec3::splat(WHITE))
    }
}

/// Per-channel mean over a buffer: sum in `f64`, then divide.
///
/// An empty buffer has a zero mean.
pub fn channel_mean(values: &[Vec3]) -> Vec3 {
    if values.is_empty() {
        return Vec3::ZERO;
    }
    let sum = values
        .iter()
        .fold(DVec3::ZERO, |acc, v| acc + v.as_dvec3());
    (sum / values.len() as f64).as_vec3()
}
