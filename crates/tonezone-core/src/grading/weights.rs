//! Luminance-derived zone weights.
//!
//! Luminance here is the plain mean of R, G and B on the 0–255 scale. It is
//! a weighting signal only, not a colorimetric brightness.
//!
//! ```text
//!   shadow    = clamp((128 − lum) / 128, 0, 1)
//!   highlight = clamp((lum − 128) / 128, 0, 1)
//!   middle    = 1 − shadow − highlight
//! ```
//!
//! ```text
//!   weight
//!   1 ┤shadow╲         ╱highlight
//!     │       ╲ middle╱
//!   0 ┼────────┴─────┴───────── lum
//!     0       128          255
//! ```

use glam::Vec3;

use crate::grading::for_each_indexed;
use crate::image::ZoneImage;
use crate::params::Zone;

/// Neutral midpoint of the 8-bit scale, where a pixel is fully midtone.
pub const MIDPOINT: f32 = 128.0;

/// Mean of the three color channels.
#[inline]
pub fn luminance(rgb: Vec3) -> f32 {
    (rgb.x + rgb.y + rgb.z) / 3.0
}

/// Fractional contribution of each zone to one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneWeights {
    pub shadow: f32,
    pub middle: f32,
    pub highlight: f32,
}

impl ZoneWeights {
    /// Piecewise-linear partition of unity over luminance.
    ///
    /// `middle` is derived by subtraction, so the three weights sum to one by
    /// construction and are never re-normalized.
    pub fn from_luminance(lum: f32) -> Self {
        let shadow = ((MIDPOINT - lum) / MIDPOINT).clamp(0.0, 1.0);
        let highlight = ((lum - MIDPOINT) / MIDPOINT).clamp(0.0, 1.0);
        // At most one of shadow/highlight is non-zero for any lum.
        debug_assert!(shadow + highlight <= 1.0, "lum {lum} overlaps both ramps");
        Self {
            shadow,
            middle: 1.0 - shadow - highlight,
            highlight,
        }
    }

    pub fn get(&self, zone: Zone) -> f32 {
        match zone {
            Zone::Shadow => self.shadow,
            Zone::Middle => self.middle,
            Zone::Highlight => self.highlight,
        }
    }

    pub fn sum(&self) -> f32 {
        self.shadow + self.middle + self.highlight
    }
}

/// Per-pixel zone weights for one image. Lives for a single call.
#[derive(Debug, Clone)]
pub struct LuminanceWeightField {
    width: u32,
    height: u32,
    weights: Vec<ZoneWeights>,
}

impl LuminanceWeightField {
    /// Weights for every pixel of `image`. Alpha is ignored.
    pub fn compute(image: &ZoneImage) -> Self {
        let cn = image.channels();
        let src = image.as_raw();
        let mut weights = vec![ZoneWeights::default(); image.pixel_count()];
        for_each_indexed(&mut weights, |i, w| {
            let px = &src[i * cn..i * cn + 3];
            let rgb = Vec3::new(f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
            *w = ZoneWeights::from_luminance(luminance(rgb));
        });
        Self {
            width: image.width(),
            height: image.height(),
            weights,
        }
    }

    /// Weights from already-widened RGB samples.
    pub fn from_rgb(width: u32, height: u32, rgb: &[Vec3]) -> Self {
        let mut weights = vec![ZoneWeights::default(); rgb.len()];
        for_each_indexed(&mut weights, |i, w| {
            *w = ZoneWeights::from_luminance(luminance(rgb[i]));
        });
        Self {
            width,
            height,
            weights,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<ZoneWeights> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.weights
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn as_slice(&self) -> &[ZoneWeights] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ChannelLayout;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_weights_sum_to_one_over_full_range() {
        for lum in 0..=255 {
            let w = ZoneWeights::from_luminance(lum as f32);
            assert!((w.sum() - 1.0).abs() < EPSILON, "lum {lum}: sum {}", w.sum());
            assert!(w.shadow >= 0.0 && w.middle >= 0.0 && w.highlight >= 0.0);
        }
    }

    #[test]
    fn test_fractional_luminance_sums_to_one() {
        let mut lum = 0.0_f32;
        while lum <= 255.0 {
            let w = ZoneWeights::from_luminance(lum);
            assert!((w.sum() - 1.0).abs() < EPSILON);
            lum += 1.0 / 3.0;
        }
    }

    #[test]
    fn test_black_is_pure_shadow() {
        let w = ZoneWeights::from_luminance(0.0);
        assert_eq!(w.shadow, 1.0);
        assert_eq!(w.highlight, 0.0);
        assert_eq!(w.middle, 0.0);
    }

    #[test]
    fn test_white_is_pure_highlight() {
        let w = ZoneWeights::from_luminance(255.0);
        // (255 - 128) / 128 is just under one, so highlight never quite saturates.
        assert!((w.highlight - 127.0 / 128.0).abs() < EPSILON);
        assert_eq!(w.shadow, 0.0);
        assert!(w.middle >= 0.0);
    }

    #[test]
    fn test_midpoint_is_pure_middle() {
        let w = ZoneWeights::from_luminance(128.0);
        assert!((w.middle - 1.0).abs() < EPSILON);
        assert_eq!(w.shadow, 0.0);
        assert_eq!(w.highlight, 0.0);
    }

    #[test]
    fn test_ramps_are_linear() {
        let w = ZoneWeights::from_luminance(64.0);
        assert!((w.shadow - 0.5).abs() < EPSILON);
        assert!((w.middle - 0.5).abs() < EPSILON);
        let w = ZoneWeights::from_luminance(192.0);
        assert!((w.highlight - 0.5).abs() < EPSILON);
        assert!((w.middle - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_field_uses_channel_mean() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0, 0, 0, 255]);
        data.extend_from_slice(&[30, 60, 90, 0]);
        let img = ZoneImage::from_raw(2, 1, ChannelLayout::Rgba, data).unwrap();
        let field = LuminanceWeightField::compute(&img);
        assert_eq!(field.get(0, 0).unwrap().shadow, 1.0);
        // lum = 60
        let w = field.get(1, 0).unwrap();
        assert!((w.shadow - 68.0 / 128.0).abs() < EPSILON);
        assert_eq!(field.get(2, 0), None);
    }

    #[test]
    fn test_field_from_rgb_matches_compute() {
        let img = ZoneImage::filled(4, 3, ChannelLayout::Rgb, [200, 100, 50, 0]);
        let rgb = vec![Vec3::new(200.0, 100.0, 50.0); 12];
        let a = LuminanceWeightField::compute(&img);
        let b = LuminanceWeightField::from_rgb(4, 3, &rgb);
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
