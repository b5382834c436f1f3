//! Transform-stage capability and the batch hook a host pipeline calls.
//!
//! The balancer itself knows nothing about pipelines. A host holds a boxed
//! [`ImageTransformStage`] and hands it each batch through [`process_batch`],
//! which skips the stage entirely while it is disabled.

use crate::error::Result;
use crate::grading::balance::ZonalColorBalancer;
use crate::image::ZoneImage;
use crate::params::BalanceSettings;

/// A pluggable per-image transform.
pub trait ImageTransformStage: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Disabled stages are never invoked.
    fn is_enabled(&self) -> bool;

    /// Check parameters without touching pixels. Called once per batch.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Produce the transformed image. The input is left untouched.
    fn apply(&self, image: &ZoneImage) -> Result<ZoneImage>;
}

/// Zonal color balance wrapped as a pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct ZonalBalanceStage {
    settings: BalanceSettings,
}

impl ZonalBalanceStage {
    pub fn new(settings: BalanceSettings) -> Self {
        Self { settings }
    }

    /// Build from the host's 16-value flattened parameter list.
    pub fn from_flat(values: &[f32]) -> Result<Self> {
        BalanceSettings::from_flat(values).map(Self::new)
    }

    pub fn settings(&self) -> &BalanceSettings {
        &self.settings
    }
}

impl ImageTransformStage for ZonalBalanceStage {
    fn name(&self) -> &str {
        "zonal-color-balance"
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn prepare(&self) -> Result<()> {
        self.settings.adjustments.validate()
    }

    fn apply(&self, image: &ZoneImage) -> Result<ZoneImage> {
        ZonalColorBalancer::adjust(image, &self.settings.adjustments)
    }
}

/// Run `stage` over every image in `images`, replacing each with its result.
///
/// A disabled stage leaves the batch untouched and returns `0`. Parameters
/// are shared by the whole batch, so they are checked once up front and a
/// failure there stops the batch before any image is replaced. Returns the
/// number of images transformed.
pub fn process_batch(stage: &dyn ImageTransformStage, images: &mut [ZoneImage]) -> Result<usize> {
    if !stage.is_enabled() {
        tracing::debug!("{}: disabled, {} image(s) passed through", stage.name(), images.len());
        return Ok(0);
    }

    stage.prepare()?;

    for (i, image) in images.iter_mut().enumerate() {
        *image = stage.apply(image)?;
        tracing::debug!("{}: image {} done", stage.name(), i);
    }

    tracing::info!("{}: transformed {} image(s)", stage.name(), images.len());
    Ok(images.len())
}
