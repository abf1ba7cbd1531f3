//! Deterministic (frequency, phase) → bucket quantization.
//!
//! Frequency is cut into half-open bands `[k·w, (k+1)·w)`; phase is wrapped
//! into [0, 2π) and cut into equal sectors. Insert and lookup share this one
//! function, so identical inputs always land on the identical key.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::constants::{BAND_WIDTH, MAX_BAND_INDEX, MAX_FREQUENCY, SECTOR_COUNT};
use crate::error::{IndexError, Result};
use crate::oscillator::OscillatorState;
use crate::phasor::normalize;

/// Discrete bucket coordinate: (frequency band index, phase sector index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    pub band: i64,
    pub sector: i64,
}

impl BucketKey {
    pub fn new(band: i64, sector: i64) -> Self {
        Self { band, sector }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantizer {
    band_width: f64,
    sector_count: u32,
}

impl Quantizer {
    pub fn new(band_width: f64, sector_count: u32) -> Result<Self> {
        if !band_width.is_finite() || band_width <= 0.0 {
            return Err(IndexError::InvalidConfig(format!(
                "band_width must be finite and > 0, got {band_width}"
            )));
        }
        if MAX_FREQUENCY / band_width > MAX_BAND_INDEX {
            return Err(IndexError::InvalidConfig(format!(
                "band_width must be >= {:e} to keep band indices in range, got {band_width}",
                MAX_FREQUENCY / MAX_BAND_INDEX
            )));
        }
        if sector_count == 0 {
            return Err(IndexError::InvalidConfig(
                "sector_count must be > 0".to_string(),
            ));
        }
        Ok(Self {
            band_width,
            sector_count,
        })
    }

    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    /// Angular width of one sector: 2π / sector_count.
    pub fn sector_width(&self) -> f64 {
        TAU / self.sector_count as f64
    }

    /// Band index by floor: 20.0 with width 10 lands in band 2, i.e. [20, 30).
    ///
    /// Frequencies within ±[`MAX_FREQUENCY`] map to |band| ≤ 2^53, so
    /// neighbour and range arithmetic on the index never overflows.
    pub fn band_of(&self, frequency: f64) -> i64 {
        debug_assert!(frequency.is_finite(), "quantizing non-finite frequency");
        (frequency / self.band_width).floor() as i64
    }

    pub fn sector_of(&self, phase: f64) -> i64 {
        debug_assert!(phase.is_finite(), "quantizing non-finite phase");
        let sector = (normalize(phase) / self.sector_width()).floor() as i64;
        // Float division can land exactly on sector_count just below 2π
        sector.min(self.sector_count as i64 - 1)
    }

    pub fn quantize(&self, frequency: f64, phase: f64) -> BucketKey {
        BucketKey {
            band: self.band_of(frequency),
            sector: self.sector_of(phase),
        }
    }

    pub fn key_of(&self, state: &OscillatorState) -> BucketKey {
        self.quantize(state.frequency(), state.phase())
    }

    /// Lower edge of a band in Hz.
    pub fn band_floor(&self, band: i64) -> f64 {
        band as f64 * self.band_width
    }

    /// Wrap a sector index onto the phase circle.
    pub fn wrap_sector(&self, sector: i64) -> i64 {
        sector.rem_euclid(self.sector_count as i64)
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            band_width: BAND_WIDTH,
            sector_count: SECTOR_COUNT,
        }
    }
}
