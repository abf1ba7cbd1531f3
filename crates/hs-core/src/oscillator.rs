use serde::{Deserialize, Serialize};

use crate::constants::{MAX_FREQUENCY, TRACE_PREFIX};
use crate::error::{IndexError, Result, ensure_finite};
use crate::phasor::{Phasor, normalize};

/// A single oscillator record: the unit that is stored in and queried against
/// the bucket index.
///
/// Frequency is the identity axis, phase the temporal position (kept
/// unwrapped, normalized on read), weight the record's strength. All values
/// are validated finite at construction, and |frequency| is bounded by
/// [`MAX_FREQUENCY`], so anything that reaches the index is safe to quantize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOscillator")]
pub struct OscillatorState {
    tag: String,
    frequency: f64,
    phase: f64,
    weight: f64,
}

#[derive(Deserialize)]
struct RawOscillator {
    tag: String,
    frequency: f64,
    #[serde(default)]
    phase: f64,
    #[serde(default = "unit_weight")]
    weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl TryFrom<RawOscillator> for OscillatorState {
    type Error = IndexError;

    fn try_from(raw: RawOscillator) -> Result<Self> {
        Self::new(raw.tag, raw.frequency, raw.phase, raw.weight)
    }
}

impl OscillatorState {
    pub fn new(tag: impl Into<String>, frequency: f64, phase: f64, weight: f64) -> Result<Self> {
        let frequency = ensure_finite("frequency", frequency)?;
        if frequency.abs() > MAX_FREQUENCY {
            return Err(IndexError::FrequencyOutOfRange(frequency));
        }
        let phase = ensure_finite("phase", phase)?;
        let weight = ensure_finite("weight", weight)?;
        if weight < 0.0 {
            return Err(IndexError::NegativeWeight(weight));
        }
        Ok(Self {
            tag: tag.into(),
            frequency,
            phase,
            weight,
        })
    }

    /// Query oscillator with unit weight. Probe weight never enters the score.
    pub fn probe(tag: impl Into<String>, frequency: f64, phase: f64) -> Result<Self> {
        Self::new(tag, frequency, phase, 1.0)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Accumulated (unwrapped) phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase wrapped into [0, 2π).
    pub fn normalized_phase(&self) -> f64 {
        normalize(self.phase)
    }

    pub fn phasor(&self) -> Phasor {
        Phasor::new(self.phase)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// A zero-weight record is logically absent.
    pub fn is_present(&self) -> bool {
        self.weight > 0.0
    }

    /// Spin forward: phase += frequency * dt. The phase is left untouched on error.
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        self.phase = self.phase_after(dt)?;
        Ok(())
    }

    /// Causal backtracking: phase -= frequency * dt.
    pub fn rewind(&mut self, dt: f64) -> Result<()> {
        self.phase = self.phase_after(-dt)?;
        Ok(())
    }

    /// Phase this record would hold after spinning for `dt`.
    pub(crate) fn phase_after(&self, dt: f64) -> Result<f64> {
        let phase = self.phase + self.frequency * dt;
        if phase.is_finite() {
            Ok(phase)
        } else {
            Err(IndexError::PhaseOverflow {
                tag: self.tag.clone(),
                dt,
            })
        }
    }

    /// Infallible spin for callers that already checked [`Self::phase_after`].
    pub(crate) fn spin(&mut self, dt: f64) {
        self.phase += self.frequency * dt;
        debug_assert!(self.phase.is_finite(), "phase overflowed advancing by {dt}");
    }

    /// Weight is clamped at zero.
    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight.max(0.0);
    }

    /// Deep copy marked as a stored trace of this record.
    pub(crate) fn to_trace(&self) -> Self {
        Self {
            tag: format!("{TRACE_PREFIX}{}", self.tag),
            ..self.clone()
        }
    }

    pub fn is_trace(&self) -> bool {
        self.tag.starts_with(TRACE_PREFIX)
    }

    /// Tag with every trace prefix stripped: the identity this record derives from.
    pub fn root_tag(&self) -> &str {
        let mut tag = self.tag.as_str();
        while let Some(rest) = tag.strip_prefix(TRACE_PREFIX) {
            tag = rest;
        }
        tag
    }

    /// True when both records derive from the same identity.
    pub fn shares_root(&self, other: &Self) -> bool {
        self.root_tag() == other.root_tag()
    }
}
