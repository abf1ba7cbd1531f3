use std::fmt;

use crate::constants::MAX_FREQUENCY;

#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// A frequency, phase, weight or duration was NaN or infinite.
    NonFinite { field: &'static str, value: f64 },
    NegativeWeight(f64),
    /// |frequency| above [`MAX_FREQUENCY`](crate::constants::MAX_FREQUENCY).
    FrequencyOutOfRange(f64),
    /// Spinning a phase by `frequency * dt` left the finite range.
    PhaseOverflow { tag: String, dt: f64 },
    /// Sweep step must be finite and non-negative.
    InvalidStep(f64),
    InvalidConfig(String),
    UnknownMode(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::NonFinite { field, value } => {
                write!(f, "{field} must be finite, got {value}")
            }
            IndexError::NegativeWeight(w) => write!(f, "weight must be >= 0, got {w}"),
            IndexError::FrequencyOutOfRange(freq) => {
                write!(f, "frequency must be within ±{MAX_FREQUENCY:e}, got {freq}")
            }
            IndexError::PhaseOverflow { tag, dt } => {
                write!(f, "phase of {tag} overflows advancing by {dt}")
            }
            IndexError::InvalidStep(dt) => {
                write!(f, "sweep step must be finite and >= 0, got {dt}")
            }
            IndexError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            IndexError::UnknownMode(s) => {
                write!(f, "unknown mode '{s}' (expected point, line, plane or space)")
            }
        }
    }
}

impl std::error::Error for IndexError {}

pub type Result<T> = std::result::Result<T, IndexError>;

/// Reject NaN and infinities at the boundary so they never reach a bucket key.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IndexError::NonFinite { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("phase", 1.5), Ok(1.5));
        assert!(matches!(
            ensure_finite("phase", f64::NAN),
            Err(IndexError::NonFinite { field: "phase", .. })
        ));
        assert!(ensure_finite("frequency", f64::INFINITY).is_err());
        assert!(ensure_finite("frequency", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_display_names_field() {
        let err = IndexError::NonFinite {
            field: "frequency",
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "frequency must be finite, got NaN");
        let err = IndexError::InvalidConfig("sector_count must be > 0".into());
        assert!(err.to_string().contains("sector_count"));
        let err = IndexError::FrequencyOutOfRange(1e300);
        assert!(err.to_string().starts_with("frequency must be within ±1e12, got 1000"));
    }
}
