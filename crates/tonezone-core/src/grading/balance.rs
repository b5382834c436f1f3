//! The zonal color balance transform.
//!
//! ```text
//!   validate ──→ weights ──→ ┌ shadow ─┐
//!                            ├ middle ─┼──→ Σ weight × zone ──→ clamp, round ──→ + alpha
//!                            └ highlight┘
//! ```
//!
//! Working memory is three pixel-sized buffers (weights, one zone buffer
//! reused by all three zones, and the blend accumulator) plus the widened
//! source, all dropped when the call returns.

use glam::Vec3;
use serde_json::Value;

use crate::error::Result;
use crate::grading::weights::LuminanceWeightField;
use crate::grading::zones::{WHITE, ZoneRecolor, channel_mean};
use crate::grading::{for_each_indexed, for_each_pixel_mut};
use crate::image::ZoneImage;
use crate::params::{ZonalAdjustments, Zone};

/// Stateless shadow/midtone/highlight color balancer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZonalColorBalancer;

impl ZonalColorBalancer {
    /// Recolor `image` with per-zone adjustments.
    ///
    /// Every zone is validated before any pixel is read; a bad zone fails the
    /// whole call with `InvalidParameters` naming it. RGB stays RGB and RGBA
    /// stays RGBA with its alpha copied through unchanged.
    pub fn adjust(image: &ZoneImage, adjustments: &ZonalAdjustments) -> Result<ZoneImage> {
        adjustments.validate()?;

        tracing::debug!(
            "zonal balance: {}x{} {}",
            image.width(),
            image.height(),
            image.layout()
        );

        if image.is_empty() {
            return Ok(image.clone());
        }

        let cn = image.channels();
        let src = image.as_raw();

        let mut rgb = vec![Vec3::ZERO; image.pixel_count()];
        for_each_indexed(&mut rgb, |i, v| {
            let px = &src[i * cn..i * cn + 3];
            *v = Vec3::new(f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        });

        let weights = LuminanceWeightField::from_rgb(image.width(), image.height(), &rgb);
        let weights = weights.as_slice();

        let mut zone_buf = vec![Vec3::ZERO; rgb.len()];
        let mut blended = vec![Vec3::ZERO; rgb.len()];

        for &zone in Zone::all() {
            let recolor = ZoneRecolor::new(adjustments.get(zone));

            for_each_indexed(&mut zone_buf, |i, v| *v = recolor.shift(rgb[i]));

            // Every brightened value of this zone must exist before the pivot is known.
            let mean = channel_mean(&zone_buf);
            tracing::trace!("zone {zone}: contrast pivot {mean:?}");

            let zone_buf = &zone_buf;
            for_each_indexed(&mut blended, |i, acc| {
                *acc += recolor.contrast(zone_buf[i], mean) * weights[i].get(zone);
            });
        }

        let mut out = vec![0u8; src.len()];
        for_each_pixel_mut(&mut out, cn, |i, px| {
            let v = blended[i].clamp(Vec3::ZERO, Vec3::splat(WHITE)).round();
            px[0] = v.x as u8;
            px[1] = v.y as u8;
            px[2] = v.z as u8;
            if cn == 4 {
                px[3] = src[i * cn + 3];
            }
        });

        ZoneImage::from_raw(image.width(), image.height(), image.layout(), out)
    }

    /// Same as [`adjust`](Self::adjust), but takes the untyped map
    /// `{ "shadow": [..5], "middle": [..5], "highlight": [..5] }`.
    pub fn adjust_json(image: &ZoneImage, adjustments: &Value) -> Result<ZoneImage> {
        let adjustments = ZonalAdjustments::from_json(adjustments)?;
        Self::adjust(image, &adjustments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BalanceError;
    use crate::image::ChannelLayout;
    use crate::params::ZoneAdjustment;
    use serde_json::json;

    fn gradient(width: u32, height: u32, layout: ChannelLayout) -> ZoneImage {
        let cn = layout.channels();
        let mut data = Vec::with_capacity((width * height) as usize * cn);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / width.max(1)) as u8);
                data.push((y * 255 / height.max(1)) as u8);
                data.push(((x + y) * 7 % 256) as u8);
                if cn == 4 {
                    data.push(((x * 13 + y * 29) % 256) as u8);
                }
            }
        }
        ZoneImage::from_raw(width, height, layout, data).unwrap()
    }

    #[test]
    fn test_identity_is_passthrough() {
        for layout in [ChannelLayout::Rgb, ChannelLayout::Rgba] {
            let img = gradient(32, 16, layout);
            let out = ZonalColorBalancer::adjust(&img, &ZonalAdjustments::default()).unwrap();
            assert_eq!(out, img, "{layout} identity should be exact");
        }
    }

    #[test]
    fn test_shadow_red_on_dark_gray() {
        let img = ZoneImage::filled(8, 8, ChannelLayout::Rgb, [20, 20, 20, 0]);
        let mut adj = ZonalAdjustments::default();
        adj.shadow = ZoneAdjustment::new(50.0, 0.0, 0.0, 1.0, 1.0);
        let out = ZonalColorBalancer::adjust(&img, &adj).unwrap();
        // lum 20: shadow weight 108/128, middle 20/128.
        // red = 0.84375 × (20 + 235 × 0.5) + 0.15625 × 20 = 119.14
        for px in out.as_raw().chunks_exact(3) {
            assert_eq!(px, &[119, 20, 20]);
        }
    }

    #[test]
    fn test_highlight_adjustment_ignores_pure_shadows() {
        let img = ZoneImage::filled(4, 4, ChannelLayout::Rgb, [0, 0, 0, 0]);
        let mut adj = ZonalAdjustments::default();
        adj.highlight = ZoneAdjustment::new(100.0, 100.0, 100.0, 5.0, 3.0);
        adj.middle = ZoneAdjustment::new(-100.0, 50.0, 0.0, 2.0, 2.0);
        let out = ZonalColorBalancer::adjust(&img, &adj).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_uniform_image_ignores_contrast() {
        let img = ZoneImage::filled(6, 6, ChannelLayout::Rgb, [128, 128, 128, 0]);
        let mut adj = ZonalAdjustments::default();
        adj.middle.contrast = 10.0;
        let out = ZonalColorBalancer::adjust(&img, &adj).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_zero_brightness_blacks_out_zone() {
        let img = ZoneImage::filled(3, 3, ChannelLayout::Rgb, [128, 128, 128, 0]);
        let mut adj = ZonalAdjustments::default();
        adj.middle.brightness = 0.0;
        let out = ZonalColorBalancer::adjust(&img, &adj).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_empty_image_passes_through() {
        let img = ZoneImage::new(0, 10, ChannelLayout::Rgba);
        let out = ZonalColorBalancer::adjust(&img, &ZonalAdjustments::default()).unwrap();
        assert_eq!(out.width(), 0);
        assert_eq!(out.height(), 10);
        assert_eq!(out.layout(), ChannelLayout::Rgba);
    }

    #[test]
    fn test_non_finite_adjustment_fails_before_processing() {
        let img = gradient(4, 4, ChannelLayout::Rgb);
        let mut adj = ZonalAdjustments::default();
        adj.shadow.brightness = f32::INFINITY;
        let err = ZonalColorBalancer::adjust(&img, &adj).unwrap_err();
        assert!(matches!(
            err,
            BalanceError::InvalidParameters {
                region: Zone::Shadow,
                ..
            }
        ));
    }

    #[test]
    fn test_adjust_json_validates_regions() {
        let img = gradient(4, 4, ChannelLayout::Rgb);
        let err = ZonalColorBalancer::adjust_json(
            &img,
            &json!({ "shadow": [0, 0, 0, 1, 1], "middle": [0, 0, 0, 1, 1] }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("highlight"));

        let out = ZonalColorBalancer::adjust_json(
            &img,
            &json!({
                "shadow": [0, 0, 0, 1, 1],
                "middle": [0, 0, 0, 1, 1],
                "highlight": [0, 0, 0, 1, 1]
            }),
        )
        .unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_huge_finite_values_clamp_instead_of_failing() {
        let img = gradient(24, 16, ChannelLayout::Rgba);
        let out = ZonalColorBalancer::adjust_json(
            &img,
            &json!({
                "shadow": [0, 0, 0, 1e39, 1],
                "middle": [-1e300, 0, 0, 1, 1e39],
                "highlight": [1e300, 0, 0, 1, 1]
            }),
        )
        .unwrap();
        assert_eq!(out.layout(), ChannelLayout::Rgba);
        assert_eq!(out.as_raw().len(), img.as_raw().len());
        assert_eq!(out.alpha(), img.alpha());
    }

    /// Straight per-pixel loops in `f64`, one zone at a time.
    fn reference(img: &ZoneImage, adj: &ZonalAdjustments) -> Vec<u8> {
        let cn = img.channels();
        let rgb: Vec<[f64; 3]> = img
            .as_raw()
            .chunks_exact(cn)
            .map(|px| [f64::from(px[0]), f64::from(px[1]), f64::from(px[2])])
            .collect();
        let mut blended = vec![[0.0_f64; 3]; rgb.len()];
        for &zone in Zone::all() {
            let a = adj.get(zone);
            let factors = [a.red, a.green, a.blue].map(|f| f64::from(f) / 100.0);
            let bright: Vec<[f64; 3]> = rgb
                .iter()
                .map(|v| {
                    let mut out = [0.0; 3];
                    for c in 0..3 {
                        let delta = (255.0 - v[c]) * factors[c].max(0.0) + v[c] * factors[c].min(0.0);
                        out[c] = (v[c] + delta) * f64::from(a.brightness);
                    }
                    out
                })
                .collect();
            let mut mean = [0.0_f64; 3];
            for b in &bright {
                for c in 0..3 {
                    mean[c] += b[c];
                }
            }
            let mean = mean.map(|m| m / rgb.len() as f64);
            for (i, v) in rgb.iter().enumerate() {
                let lum = (v[0] + v[1] + v[2]) / 3.0;
                let ws = ((128.0 - lum) / 128.0).clamp(0.0, 1.0);
                let wh = ((lum - 128.0) / 128.0).clamp(0.0, 1.0);
                let w = match zone {
                    Zone::Shadow => ws,
                    Zone::Middle => 1.0 - ws - wh,
                    Zone::Highlight => wh,
                };
                for c in 0..3 {
                    let contrasted = ((bright[i][c] - mean[c]) * f64::from(a.contrast) + mean[c])
                        .clamp(0.0, 255.0);
                    blended[i][c] += contrasted * w;
                }
            }
        }
        let mut out = Vec::with_capacity(img.as_raw().len());
        for (i, px) in img.as_raw().chunks_exact(cn).enumerate() {
            for c in 0..3 {
                out.push(blended[i][c].clamp(0.0, 255.0).round() as u8);
            }
            if cn == 4 {
                out.push(px[3]);
            }
        }
        out
    }

    fn graded() -> ZonalAdjustments {
        ZonalAdjustments::new(
            ZoneAdjustment::new(30.0, -10.0, 5.0, 1.2, 0.8),
            ZoneAdjustment::new(-25.0, 15.0, 0.0, 0.9, 1.6),
            ZoneAdjustment::new(0.0, 40.0, -60.0, 1.1, 2.5),
        )
    }

    #[test]
    fn test_large_image_matches_scalar_reference() {
        // Large enough that every pass is split across several chunks.
        let img = gradient(160, 160, ChannelLayout::Rgba);
        let adj = graded();
        let out = ZonalColorBalancer::adjust(&img, &adj).unwrap();
        let expected = reference(&img, &adj);
        assert_eq!(out.as_raw().len(), expected.len());
        for (i, (&got, &want)) in out.as_raw().iter().zip(&expected).enumerate() {
            assert!(
                (i32::from(got) - i32::from(want)).abs() <= 1,
                "sample {i}: {got} vs {want}"
            );
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_thread_count_does_not_change_result() {
        let img = gradient(160, 160, ChannelLayout::Rgb);
        let adj = graded();
        let run = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| ZonalColorBalancer::adjust(&img, &adj).unwrap())
        };
        let single = run(1);
        assert_eq!(run(4), single);
        assert_eq!(run(7), single);
    }
}
