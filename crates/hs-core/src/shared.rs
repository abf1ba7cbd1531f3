//! Thread-safe handle around a [`BucketIndex`].
//!
//! One exclusive lock covers each whole operation. A sweep both mutates and
//! deletes traces, so a concurrent lookup must observe the index either
//! entirely before or entirely after it. Results are owned clones, never
//! references into the map.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::index::{BucketIndex, Resonance, SweepReport};
use crate::mode::Mode;
use crate::oscillator::OscillatorState;

#[derive(Clone, Debug, Default)]
pub struct SharedIndex {
    inner: Arc<Mutex<BucketIndex>>,
}

impl SharedIndex {
    pub fn new(index: BucketIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BucketIndex> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            // Every operation leaves the map consistent before it can panic
            tracing::warn!("bucket index lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn insert(&self, record: &OscillatorState) -> Option<OscillatorState> {
        self.lock().insert(record)
    }

    pub fn decay_sweep(&self, dt: f64) -> Result<SweepReport> {
        self.lock().decay_sweep(dt)
    }

    pub fn resonate(&self, probe: &OscillatorState) -> Option<OscillatorState> {
        self.lock().resonate(probe)
    }

    pub fn resonate_scored(&self, probe: &OscillatorState) -> Option<Resonance> {
        self.lock().resonate_scored(probe)
    }

    pub fn operate(&self, probe: &OscillatorState, mode: Mode) -> Vec<OscillatorState> {
        self.lock().operate(probe, mode)
    }

    pub fn population(&self) -> usize {
        self.lock().population()
    }

    pub fn evicted(&self) -> u64 {
        self.lock().evicted()
    }

    /// Run several operations under one lock acquisition, e.g. a whole tick.
    pub fn with<R>(&self, f: impl FnOnce(&mut BucketIndex) -> R) -> R {
        f(&mut *self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn osc(tag: &str, frequency: f64, phase: f64, weight: f64) -> OscillatorState {
        OscillatorState::new(tag, frequency, phase, weight).unwrap()
    }

    #[test]
    fn test_clones_share_one_index() {
        let a = SharedIndex::default();
        let b = a.clone();
        a.insert(&osc("A", 432.0, 0.0, 10.0));
        assert_eq!(b.population(), 1);
        let probe = OscillatorState::probe("p", 432.0, 0.0).unwrap();
        assert_eq!(b.resonate(&probe).unwrap().root_tag(), "A");
    }

    #[test]
    fn test_concurrent_lookups_see_whole_sweeps() {
        let shared = SharedIndex::default();
        for i in 0..64 {
            shared.insert(&osc(&format!("r{i}"), i as f64 * 10.0 + 5.0, 0.0, 0.3));
        }

        thread::scope(|s| {
            let writer = shared.clone();
            s.spawn(move || {
                for _ in 0..20 {
                    writer.decay_sweep(0.5).unwrap();
                }
            });
            for _ in 0..4 {
                let reader = shared.clone();
                s.spawn(move || {
                    for i in 0..200 {
                        let f = (i % 64) as f64 * 10.0 + 5.0;
                        let probe = OscillatorState::probe("p", f, 0.0).unwrap();
                        for trace in reader.operate(&probe, Mode::Space) {
                            // lookups never expose stale traces
                            assert!(trace.weight() > 0.1);
                        }
                    }
                });
            }
        });

        // every record decays out well within 20 sweeps of 0.5
        assert_eq!(shared.population(), 0);
        assert_eq!(shared.evicted(), 64);
    }

    #[test]
    fn test_with_runs_tick_atomically() {
        let shared = SharedIndex::default();
        let report = shared.with(|index| {
            index.insert(&osc("A", 432.0, 0.0, 10.0));
            index.insert(&osc("B", 100.0, 0.0, 0.11));
            index.decay_sweep(1.0).unwrap()
        });
        assert_eq!(report.evicted, 1);
        assert_eq!(shared.population(), 1);
    }
}
