//! Error types for zonal color balancing.

use crate::params::Zone;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BalanceError>;

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// A zone's adjustment entry is missing or malformed. Raised before any
    /// pixel is touched.
    #[error("invalid adjustments for \"{region}\": {reason}")]
    InvalidParameters { region: Zone, reason: String },

    /// The host's flattened parameter list has the wrong number of values.
    #[error("expected {expected} flattened settings values, got {actual}")]
    SettingsLength { expected: usize, actual: usize },

    /// Raw pixel buffer does not match `width * height * channels`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("malformed settings: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BalanceError {
    pub(crate) fn invalid(region: Zone, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            region,
            reason: reason.into(),
        }
    }

    /// The zone an `InvalidParameters` error refers to, if any.
    pub fn region(&self) -> Option<Zone> {
        match self {
            Self::InvalidParameters { region, .. } => Some(*region),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters_message_names_region() {
        let err = BalanceError::invalid(Zone::Middle, "entry is missing");
        let msg = err.to_string();
        assert!(msg.contains("middle"), "{msg}");
        assert!(msg.contains("entry is missing"), "{msg}");
        assert_eq!(err.region(), Some(Zone::Middle));
    }

    #[test]
    fn test_non_parameter_errors_have_no_region() {
        let err = BalanceError::SettingsLength {
            expected: 16,
            actual: 3,
        };
        assert_eq!(err.region(), None);
        assert_eq!(err.to_string(), "expected 16 flattened settings values, got 3");
    }
}
