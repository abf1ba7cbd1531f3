use std::collections::HashMap;

use serde::Serialize;

use crate::affinity::AffinityScorer;
use crate::config::IndexConfig;
use crate::constants::DECAY_EPSILON;
use crate::error::{IndexError, Result};
use crate::mode::Mode;
use crate::oscillator::OscillatorState;
use crate::quantizer::{BucketKey, Quantizer};

/// Outcome of one decay sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub evicted: usize,
    pub survivors: usize,
}

/// Best POINT-mode match together with its score and bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resonance {
    pub trace: OscillatorState,
    pub score: f64,
    pub key: BucketKey,
}

/// Phase-bucket associative memory.
///
/// Each `(band, sector)` bucket holds at most one trace; a newer insert into
/// an occupied bucket replaces the older trace. Traces age through
/// [`decay_sweep`](Self::decay_sweep), which must run once per tick: without
/// it nothing is ever forgotten and the map only grows.
///
/// A trace whose weight is at or below the eviction floor is stale. Stale
/// traces may still occupy a bucket until the next sweep, but every lookup
/// treats them as absent.
#[derive(Clone, Debug)]
pub struct BucketIndex {
    config: IndexConfig,
    quantizer: Quantizer,
    scorer: AffinityScorer,
    buckets: HashMap<BucketKey, OscillatorState>,
    evicted: u64,
}

impl BucketIndex {
    pub fn new(
        band_width: f64,
        sector_count: u32,
        decay_rate: f64,
        eviction_floor: f64,
        acceptance_threshold: f64,
    ) -> Result<Self> {
        Self::with_config(IndexConfig {
            band_width,
            sector_count,
            decay_rate,
            eviction_floor,
            acceptance_threshold,
            ..IndexConfig::default()
        })
    }

    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            quantizer: config.quantizer()?,
            scorer: config.scorer()?,
            config,
            buckets: HashMap::new(),
            evicted: 0,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn scorer(&self) -> &AffinityScorer {
        &self.scorer
    }

    /// Physically stored traces, stale ones included.
    pub fn population(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total traces evicted by decay since construction.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Exact bucket lookup. Returns stale traces too; see [`Self::is_live`].
    pub fn get(&self, key: &BucketKey) -> Option<&OscillatorState> {
        self.buckets.get(key)
    }

    pub fn traces(&self) -> impl Iterator<Item = (&BucketKey, &OscillatorState)> {
        self.buckets.iter()
    }

    /// Drop every trace. The eviction counter is kept.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Whether a stored trace is visible to lookups.
    pub fn is_live(&self, trace: &OscillatorState) -> bool {
        trace.is_present() && trace.weight() > self.config.eviction_floor
    }

    /// Store a trace (deep copy) of `record` in its bucket.
    ///
    /// Last write wins: an existing occupant is replaced and returned.
    pub fn insert(&mut self, record: &OscillatorState) -> Option<OscillatorState> {
        let key = self.quantizer.key_of(record);
        let trace = record.to_trace();
        let displaced = self.buckets.insert(key, trace);
        if let Some(old) = &displaced {
            tracing::debug!(
                "bucket ({}, {}) overwritten: {} replaced by {}",
                key.band,
                key.sector,
                old.tag(),
                record.tag()
            );
        }
        displaced
    }

    /// Age every trace by `dt`: spin its phase, decay its weight
    /// hyperbolically, and evict it once weight falls to the floor.
    ///
    /// weight -= decay_rate / (weight + ε) · dt
    ///
    /// Light traces lose proportionally more per tick than heavy ones. Once the
    /// decrement falls below the float spacing of the weight (around
    /// `w² > decay_rate · dt / f64::EPSILON`) the weight no longer moves.
    /// Traces keep the bucket they were inserted under.
    ///
    /// Fails without touching any trace if `dt` is negative or non-finite, or
    /// if some trace's phase would leave the finite range.
    pub fn decay_sweep(&mut self, dt: f64) -> Result<SweepReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(IndexError::InvalidStep(dt));
        }

        // all or nothing: no trace is touched if any phase would overflow
        for trace in self.buckets.values() {
            trace.phase_after(dt)?;
        }

        let decay_rate = self.config.decay_rate;
        let floor = self.config.eviction_floor;
        let before = self.buckets.len();

        self.buckets.retain(|key, trace| {
            trace.spin(dt);
            let w = trace.weight();
            trace.set_weight(w - decay_rate / (w + DECAY_EPSILON) * dt);
            if trace.weight() <= floor {
                tracing::trace!(
                    "evicting {} from ({}, {}) at weight {:.4}",
                    trace.tag(),
                    key.band,
                    key.sector,
                    trace.weight()
                );
                false
            } else {
                true
            }
        });

        let survivors = self.buckets.len();
        let evicted = before - survivors;
        self.evicted += evicted as u64;

        tracing::debug!("decay sweep dt={dt}: {evicted} evicted, {survivors} remain");

        Ok(SweepReport { evicted, survivors })
    }

    /// POINT-mode lookup: the best-scoring live, non-self trace in the 3×3
    /// neighbourhood of the probe's bucket, if it beats the acceptance
    /// threshold.
    pub fn resonate(&self, probe: &OscillatorState) -> Option<OscillatorState> {
        self.resonate_scored(probe).map(|r| r.trace)
    }

    /// [`resonate`](Self::resonate) with the winning score and bucket.
    ///
    /// Neighbours are visited band-major, sector-minor; on equal scores the
    /// first visited wins.
    pub fn resonate_scored(&self, probe: &OscillatorState) -> Option<Resonance> {
        let center = self.quantizer.key_of(probe);
        let mut best: Option<(BucketKey, &OscillatorState, f64)> = None;

        for key in self.neighborhood(center) {
            let Some(trace) = self.candidate(&key, probe) else {
                continue;
            };
            let score = self.scorer.score(probe, trace);
            if best.is_none_or(|(_, _, s)| score > s) {
                best = Some((key, trace, score));
            }
        }

        best.filter(|&(_, _, score)| score > self.config.acceptance_threshold)
            .map(|(key, trace, score)| Resonance {
                trace: trace.clone(),
                score,
                key,
            })
    }

    /// Multi-resolution query.
    ///
    /// POINT yields at most one trace. LINE, PLANE and SPACE yield every
    /// live, non-self trace in the scanned bands, ordered by
    /// (normalized phase, frequency).
    pub fn operate(&self, probe: &OscillatorState, mode: Mode) -> Vec<OscillatorState> {
        match mode.band_radius(&self.config) {
            None => self.resonate(probe).into_iter().collect(),
            Some(radius) => self.scan(probe, radius),
        }
    }

    fn scan(&self, probe: &OscillatorState, radius: u32) -> Vec<OscillatorState> {
        let center = self.quantizer.band_of(probe.frequency());
        let radius = i64::from(radius);
        let sectors = i64::from(self.quantizer.sector_count());

        let mut found: Vec<OscillatorState> = ((center - radius)..=(center + radius))
            .flat_map(|band| (0..sectors).map(move |sector| BucketKey::new(band, sector)))
            .filter_map(|key| self.candidate(&key, probe))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            a.normalized_phase()
                .total_cmp(&b.normalized_phase())
                .then(a.frequency().total_cmp(&b.frequency()))
        });
        found
    }

    /// The 3×3 block around `center`: bands ±1 (not wrapped), sectors ±1
    /// (wrapped around the circle). With fewer than three sectors the wrapped
    /// sectors coincide; each bucket is listed once.
    fn neighborhood(&self, center: BucketKey) -> Vec<BucketKey> {
        let mut keys = Vec::with_capacity(9);
        for d_band in -1..=1 {
            for d_sector in -1..=1 {
                let key = BucketKey::new(
                    center.band + d_band,
                    self.quantizer.wrap_sector(center.sector + d_sector),
                );
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Live trace in `key` that does not derive from the probe itself.
    fn candidate(&self, key: &BucketKey, probe: &OscillatorState) -> Option<&OscillatorState> {
        self.buckets
            .get(key)
            .filter(|trace| self.is_live(trace) && !trace.shares_root(probe))
    }
}

impl Default for BucketIndex {
    fn default() -> Self {
        Self {
            config: IndexConfig::default(),
            quantizer: Quantizer::default(),
            scorer: AffinityScorer::default(),
            buckets: HashMap::new(),
            evicted: 0,
        }
    }
}
