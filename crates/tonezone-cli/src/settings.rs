//! Settings resolution for the CLI: file, environment, then per-zone flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tonezone_core::{BalanceSettings, Zone, ZoneAdjustment};

/// Fallback settings file when `--settings` is not given.
pub const SETTINGS_ENV: &str = "TONEZONE_SETTINGS";

/// Per-zone overrides from the command line, as raw `R,G,B,BRIGHT,CONTRAST` strings.
#[derive(Debug, Default, Clone)]
pub struct ZoneOverrides {
    pub shadow: Option<String>,
    pub middle: Option<String>,
    pub highlight: Option<String>,
}

impl ZoneOverrides {
    fn get(&self, zone: Zone) -> Option<&str> {
        match zone {
            Zone::Shadow => self.shadow.as_deref(),
            Zone::Middle => self.middle.as_deref(),
            Zone::Highlight => self.highlight.as_deref(),
        }
    }
}

/// Build the effective settings.
///
/// Starts from `path` (or `$TONEZONE_SETTINGS`), otherwise enabled identity
/// settings; zone flags then replace whole zones; `disable` wins last.
pub fn resolve(path: Option<&Path>, overrides: &ZoneOverrides, disable: bool) -> Result<BalanceSettings> {
    let path: Option<PathBuf> = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from));

    let mut settings = match &path {
        Some(p) => {
            tracing::debug!("loading settings from {}", p.display());
            BalanceSettings::from_json_file(p)
                .with_context(|| format!("failed to load settings from {}", p.display()))?
        }
        None => BalanceSettings {
            enabled: true,
            ..BalanceSettings::default()
        },
    };

    for &zone in Zone::all() {
        if let Some(raw) = overrides.get(zone) {
            *settings.adjustments.get_mut(zone) = parse_zone(zone, raw)?;
        }
    }

    if disable {
        settings.enabled = false;
    }
    Ok(settings)
}

/// Parse `R,G,B,BRIGHT,CONTRAST` for one zone.
pub fn parse_zone(zone: Zone, raw: &str) -> Result<ZoneAdjustment> {
    let values = raw
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("--{zone}: '{}' is not a number", s.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ZoneAdjustment::from_values(zone, &values)?)
}
