use serde::{Deserialize, Serialize};

use crate::constants::FREQUENCY_K;
use crate::error::{IndexError, Result};
use crate::oscillator::OscillatorState;

/// Resonance score between a probe and a stored candidate.
///
/// score = frequency_affinity × phase_affinity × candidate.weight
///
/// The product makes every term a gate: a candidate far off in frequency,
/// in phase opposition, or with no weight left scores (near) zero no matter
/// how well the other terms match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityScorer {
    frequency_k: f64,
}

impl AffinityScorer {
    pub fn new(frequency_k: f64) -> Result<Self> {
        if !frequency_k.is_finite() || frequency_k < 0.0 {
            return Err(IndexError::InvalidConfig(format!(
                "frequency_k must be finite and >= 0, got {frequency_k}"
            )));
        }
        Ok(Self { frequency_k })
    }

    pub fn frequency_k(&self) -> f64 {
        self.frequency_k
    }

    /// 1 / (1 + k·|Δf|). Range (0, 1], 1 at identical frequency.
    pub fn frequency_affinity(&self, a: f64, b: f64) -> f64 {
        1.0 / (1.0 + self.frequency_k * (a - b).abs())
    }

    /// (cos Δφ + 1) / 2. Range [0, 1], 0 at phase opposition.
    pub fn phase_affinity(probe: &OscillatorState, candidate: &OscillatorState) -> f64 {
        probe.phasor().alignment(candidate.phasor())
    }

    pub fn score(&self, probe: &OscillatorState, candidate: &OscillatorState) -> f64 {
        self.frequency_affinity(probe.frequency(), candidate.frequency())
            * Self::phase_affinity(probe, candidate)
            * candidate.weight()
    }
}

impl Default for AffinityScorer {
    fn default() -> Self {
        Self {
            frequency_k: FREQUENCY_K,
        }
    }
}
