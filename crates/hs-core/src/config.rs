//! Index configuration

use serde::{Deserialize, Serialize};

use crate::affinity::AffinityScorer;
use crate::constants::{
    ACCEPTANCE_THRESHOLD, BAND_WIDTH, DECAY_RATE, EVICTION_FLOOR, FREQUENCY_K, SECTOR_COUNT,
    SPACE_RADIUS,
};
use crate::error::{IndexError, Result};
use crate::quantizer::Quantizer;

/// Tuning for a [`BucketIndex`](crate::BucketIndex).
///
/// Missing fields deserialize to the reference values, so a config file only
/// needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Quantization granularity on the frequency axis (Hz per band).
    pub band_width: f64,

    /// Quantization granularity on the phase axis (sectors per turn).
    pub sector_count: u32,

    /// Hyperbolic decay constant.
    pub decay_rate: f64,

    /// Weight at or below which a trace is stale and evicted.
    pub eviction_floor: f64,

    /// Minimum score for a POINT lookup to report a match.
    pub acceptance_threshold: f64,

    /// Frequency affinity falloff.
    pub frequency_k: f64,

    /// Bands scanned on each side of the probe in SPACE mode.
    pub space_radius: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            band_width: BAND_WIDTH,
            sector_count: SECTOR_COUNT,
            decay_rate: DECAY_RATE,
            eviction_floor: EVICTION_FLOOR,
            acceptance_threshold: ACCEPTANCE_THRESHOLD,
            frequency_k: FREQUENCY_K,
            space_radius: SPACE_RADIUS,
        }
    }
}

impl IndexConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.quantizer()?;
        self.scorer()?;
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(invalid("decay_rate must be finite and >= 0", self.decay_rate));
        }
        if !self.eviction_floor.is_finite() || self.eviction_floor < 0.0 {
            return Err(invalid(
                "eviction_floor must be finite and >= 0",
                self.eviction_floor,
            ));
        }
        if !self.acceptance_threshold.is_finite() {
            return Err(invalid(
                "acceptance_threshold must be finite",
                self.acceptance_threshold,
            ));
        }
        Ok(())
    }

    pub fn quantizer(&self) -> Result<Quantizer> {
        Quantizer::new(self.band_width, self.sector_count)
    }

    pub fn scorer(&self) -> Result<AffinityScorer> {
        AffinityScorer::new(self.frequency_k)
    }
}

fn invalid(msg: &str, value: f64) -> IndexError {
    IndexError::InvalidConfig(format!("{msg}, got {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(IndexConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_divisors() {
        let cfg = IndexConfig {
            sector_count: 0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sector_count"), "{err}");

        let cfg = IndexConfig {
            band_width: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("band_width"));

        let cfg = IndexConfig {
            band_width: 1e-9,
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("band indices"));
    }

    #[test]
    fn test_rejects_bad_rates() {
        for cfg in [
            IndexConfig {
                decay_rate: -1.0,
                ..Default::default()
            },
            IndexConfig {
                eviction_floor: f64::NAN,
                ..Default::default()
            },
            IndexConfig {
                acceptance_threshold: f64::INFINITY,
                ..Default::default()
            },
            IndexConfig {
                frequency_k: -0.5,
                ..Default::default()
            },
        ] {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_partial_toml_keeps_reference_values() {
        let cfg: IndexConfig = toml::from_str("sector_count = 12\nspace_radius = 2\n").unwrap();
        assert_eq!(cfg.sector_count, 12);
        assert_eq!(cfg.space_radius, 2);
        assert_eq!(cfg.band_width, BAND_WIDTH);
        assert_eq!(cfg.eviction_floor, EVICTION_FLOOR);
    }
}
