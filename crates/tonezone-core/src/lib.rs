//! Tonezone Core — zonal color balance for 8-bit images.
//!
//! Splits the tonal range into shadow, midtone and highlight zones by
//! per-pixel luminance, recolors the image once per zone, and blends the
//! three results back together with smooth luminance weights. No I/O.

pub mod error;
pub mod grading;
pub mod image;
pub mod params;
pub mod stage;

// Re-exports for convenience.
pub use error::{BalanceError, Result};
pub use grading::balance::ZonalColorBalancer;
pub use grading::weights::{LuminanceWeightField, ZoneWeights};
pub use crate::image::{ChannelLayout, ZoneImage};
pub use params::{BalanceSettings, ZonalAdjustments, Zone, ZoneAdjustment};
pub use stage::{ImageTransformStage, ZonalBalanceStage, process_batch};
