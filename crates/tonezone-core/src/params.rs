//! Zone parameters — the contract between the host and the balancer.
//!
//! `ZonalAdjustments` is the single source of truth for one call: three named
//! zone records, each with five named fields. Hosts that hand over untyped
//! data (JSON maps, flattened slider lists) go through the validating
//! constructors here so a malformed region is rejected by name before any
//! pixel work starts.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::Serialize;
use serde_json::Value;

use crate::error::{BalanceError, Result};

/// Number of values in one zone tuple: `(red, green, blue, brightness, contrast)`.
pub const ZONE_VALUE_COUNT: usize = 5;

/// Length of the host's flattened list: the enable flag plus three zone tuples.
pub const FLAT_SETTINGS_LEN: usize = 1 + 3 * ZONE_VALUE_COUNT;

/// Luminance-defined region of the tonal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Shadow,
    Middle,
    Highlight,
}

impl Zone {
    /// Stable key used in adjustment maps and error messages.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Shadow => "shadow",
            Self::Middle => "middle",
            Self::Highlight => "highlight",
        }
    }

    /// All zones in processing (and flattening) order.
    pub fn all() -> &'static [Self] {
        const ALL: [Zone; 3] = [Zone::Shadow, Zone::Middle, Zone::Highlight];
        &ALL
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Color, brightness and contrast adjustment for one zone.
///
/// Serialized as the ordered tuple `[red, green, blue, brightness, contrast]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f32; 5]")]
pub struct ZoneAdjustment {
    /// Red shift in percent. Positive pushes toward white, negative toward black.
    pub red: f32,
    /// Green shift in percent.
    pub green: f32,
    /// Blue shift in percent.
    pub blue: f32,
    /// Uniform multiplier applied after the color shift. 1.0 = neutral.
    pub brightness: f32,
    /// Contrast multiplier around the image-wide mean. 1.0 = neutral.
    pub contrast: f32,
}

impl Default for ZoneAdjustment {
    /// Identity: leaves the zone unchanged.
    fn default() -> Self {
        Self {
            red: 0.0,
            green: 0.0,
            blue: 0.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl From<[f32; 5]> for ZoneAdjustment {
    fn from(v: [f32; 5]) -> Self {
        Self {
            red: v[0],
            green: v[1],
            blue: v[2],
            brightness: v[3],
            contrast: v[4],
        }
    }
}

impl From<ZoneAdjustment> for [f32; 5] {
    fn from(adj: ZoneAdjustment) -> Self {
        adj.to_array()
    }
}

impl ZoneAdjustment {
    pub const fn new(red: f32, green: f32, blue: f32, brightness: f32, contrast: f32) -> Self {
        Self {
            red,
            green,
            blue,
            brightness,
            contrast,
        }
    }

    /// Build from an ordered numeric tuple, rejecting anything that is not
    /// exactly five finite numbers.
    ///
    /// Finite values beyond the `f32` range saturate to `±f32::MAX`; the pixel
    /// math clamps them like any other extreme.
    pub fn from_values(zone: Zone, values: &[f64]) -> Result<Self> {
        if values.len() != ZONE_VALUE_COUNT {
            return Err(BalanceError::invalid(
                zone,
                format!("expected {ZONE_VALUE_COUNT} values, got {}", values.len()),
            ));
        }
        let mut out = [0.0_f32; ZONE_VALUE_COUNT];
        for (i, (dst, &v)) in out.iter_mut().zip(values).enumerate() {
            if !v.is_finite() {
                return Err(BalanceError::invalid(
                    zone,
                    format!("value {i} is not finite ({v})"),
                ));
            }
            *dst = v.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32;
        }
        Ok(Self::from(out))
    }

    pub const fn to_array(&self) -> [f32; 5] {
        [self.red, self.green, self.blue, self.brightness, self.contrast]
    }

    /// Per-channel color shift as fractions (`percent / 100`).
    pub fn color_factors(&self) -> Vec3 {
        Vec3::new(self.red, self.green, self.blue) / 100.0
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self, zone: Zone) -> Result<()> {
        const NAMES: [&str; ZONE_VALUE_COUNT] = ["red", "green", "blue", "brightness", "contrast"];
        for (name, v) in NAMES.iter().zip(self.to_array()) {
            if !v.is_finite() {
                return Err(BalanceError::invalid(
                    zone,
                    format!("{name} is not finite ({v})"),
                ));
            }
        }
        Ok(())
    }
}

/// The three zone adjustments for one call. All are mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ZonalAdjustments {
    pub shadow: ZoneAdjustment,
    pub middle: ZoneAdjustment,
    pub highlight: ZoneAdjustment,
}

impl ZonalAdjustments {
    pub const fn new(
        shadow: ZoneAdjustment,
        middle: ZoneAdjustment,
        highlight: ZoneAdjustment,
    ) -> Self {
        Self {
            shadow,
            middle,
            highlight,
        }
    }

    pub const fn get(&self, zone: Zone) -> &ZoneAdjustment {
        match zone {
            Zone::Shadow => &self.shadow,
            Zone::Middle => &self.middle,
            Zone::Highlight => &self.highlight,
        }
    }

    pub fn get_mut(&mut self, zone: Zone) -> &mut ZoneAdjustment {
        match zone {
            Zone::Shadow => &mut self.shadow,
            Zone::Middle => &mut self.middle,
            Zone::Highlight => &mut self.highlight,
        }
    }

    /// Check every zone independently; the first bad zone is reported.
    pub fn validate(&self) -> Result<()> {
        for &zone in Zone::all() {
            self.get(zone).validate(zone)?;
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        Zone::all().iter().all(|&z| self.get(z).is_identity())
    }

    /// Parse an untyped map `{ "shadow": [..5], "middle": [..5], "highlight": [..5] }`.
    ///
    /// Every region must be present and hold exactly five numbers. Extra keys
    /// are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut out = Self::default();
        for &zone in Zone::all() {
            *out.get_mut(zone) = zone_from_json(zone, value.get(zone.key()))?;
        }
        Ok(out)
    }
}

fn zone_from_json(zone: Zone, entry: Option<&Value>) -> Result<ZoneAdjustment> {
    let entry = entry.ok_or_else(|| BalanceError::invalid(zone, "entry is missing"))?;
    let Value::Array(items) = entry else {
        return Err(BalanceError::invalid(
            zone,
            format!(
                "expected an array of {ZONE_VALUE_COUNT} numbers, got {}",
                json_type_name(entry)
            ),
        ));
    };
    if items.len() != ZONE_VALUE_COUNT {
        return Err(BalanceError::invalid(
            zone,
            format!("expected {ZONE_VALUE_COUNT} values, got {}", items.len()),
        ));
    }
    let mut values = [0.0_f64; ZONE_VALUE_COUNT];
    for (i, (dst, item)) in values.iter_mut().zip(items).enumerate() {
        *dst = item.as_f64().ok_or_else(|| {
            BalanceError::invalid(
                zone,
                format!("value {i} is {}, not a number", json_type_name(item)),
            )
        })?;
    }
    ZoneAdjustment::from_values(zone, &values)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Host-side settings: the enable flag plus the three zone adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceSettings {
    /// When false the balancer is never invoked and images pass through.
    pub enabled: bool,
    #[serde(flatten)]
    pub adjustments: ZonalAdjustments,
}

impl Default for BalanceSettings {
    /// Disabled, with identity adjustments.
    fn default() -> Self {
        Self {
            enabled: false,
            adjustments: ZonalAdjustments::default(),
        }
    }
}

impl BalanceSettings {
    pub const fn new(enabled: bool, adjustments: ZonalAdjustments) -> Self {
        Self {
            enabled,
            adjustments,
        }
    }

    /// Rebuild settings from the host's flattened value list:
    /// `[enabled, shadowR, shadowG, shadowB, shadowBright, shadowContrast, midR, ..., highlightContrast]`.
    ///
    /// `enabled` is true for any non-zero value.
    pub fn from_flat(values: &[f32]) -> Result<Self> {
        if values.len() != FLAT_SETTINGS_LEN {
            return Err(BalanceError::SettingsLength {
                expected: FLAT_SETTINGS_LEN,
                actual: values.len()
            });
        }
        let mut adjustments = ZonalAdjustments::default();
        for (&zone, chunk) in Zone::all().iter().zip(values[1..].chunks_exact(ZONE_VALUE_COUNT)) {
            let tuple: Vec<f64> = chunk.iter().map(|&v| f64::from(v)).collect();
            *adjustments.get_mut(zone) = ZoneAdjustment::from_values(zone, &tuple)?;
        }
        Ok(Self {
            enabled: values[0] != 0.0,
            adjustments,
        })
    }

    /// Flatten back into the host's positional order.
    pub fn to_flat(&self) -> [f32; FLAT_SETTINGS_LEN] {
        let mut out = [0.0_f32; FLAT_SETTINGS_LEN];
        out[0] = if self.enabled { 1.0 } else { 0.0 };
        for (&zone, chunk) in Zone::all()
            .iter()
            .zip(out[1..].chunks_exact_mut(ZONE_VALUE_COUNT))
        {
            chunk.copy_from_slice(&self.adjustments.get(zone).to_array());
        }
        out
    }

    /// Parse `{ "enabled": bool, "shadow": [..5], "middle": [..5], "highlight": [..5] }`.
    ///
    /// `enabled` defaults to `true` when absent, so a bare adjustment map is
    /// treated as an active request.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(BalanceError::Settings(format!(
                "expected a JSON object, got {}",
                json_type_name(value)
            )));
        }
        let enabled = match value.get("enabled") {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(BalanceError::Settings(format!(
                    "\"enabled\" must be a boolean, got {}",
                    json_type_name(other)
                )));
            }
        };
        let adjustments = ZonalAdjustments::from_json(value)?;
        Ok(Self {
            enabled,
            adjustments,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| BalanceError::Settings(e.to_string()))?;
        Self::from_json_value(&value)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BalanceError::Settings(e.to_string()))
    }
}
