//! Scripted orchestration: replay a scenario file tick by tick.
//!
//! Each tick runs in strict order: all inserts, exactly one decay sweep,
//! then all queries. Scenario files are TOML:
//!
//! ```toml
//! [[tick]]
//! dt = 0.0
//! inserts = [{ tag = "A", frequency = 432.0, phase = 0.0, weight = 10.0 }]
//! queries = [{ probe = { tag = "probe", frequency = 432.0 }, mode = "point" }]
//! ```

use hs_core::{BucketIndex, Mode, OscillatorState, SweepReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "tick")]
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Deserialize)]
pub struct Tick {
    /// Simulated time elapsed by this tick's sweep.
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub inserts: Vec<OscillatorState>,
    #[serde(default)]
    pub queries: Vec<Query>,
}

fn default_dt() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct Query {
    pub probe: OscillatorState,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Serialize)]
pub struct TickReport {
    pub tick: usize,
    pub inserted: usize,
    pub overwritten: usize,
    pub sweep: SweepReport,
    pub population: usize,
    pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub probe: String,
    pub mode: Mode,
    pub matches: Vec<OscillatorState>,
}

impl Scenario {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Run every tick against `index`.
    pub fn replay(&self, index: &mut BucketIndex) -> hs_core::Result<Vec<TickReport>> {
        let mut reports = Vec::with_capacity(self.ticks.len());

        for (i, tick) in self.ticks.iter().enumerate() {
            let overwritten = tick
                .inserts
                .iter()
                .filter_map(|record| index.insert(record))
                .count();

            let sweep = index.decay_sweep(tick.dt)?;

            let queries = tick
                .queries
                .iter()
                .map(|q| QueryReport {
                    probe: q.probe.tag().to_string(),
                    mode: q.mode,
                    matches: index.operate(&q.probe, q.mode),
                })
                .collect();

            tracing::debug!(
                "tick {i}: {} inserted, {} evicted, population {}",
                tick.inserts.len(),
                sweep.evicted,
                index.population()
            );

            reports.push(TickReport {
                tick: i,
                inserted: tick.inserts.len(),
                overwritten,
                sweep,
                population: index.population(),
                queries,
            });
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[[tick]]
dt = 0.0
inserts = [
    { tag = "A", frequency = 432.0, phase = 0.0, weight = 10.0 },
    { tag = "B", frequency = 100.0, phase = 3.141592653589793, weight = 10.0 },
]
queries = [
    { probe = { tag = "probe", frequency = 432.0, phase = 0.0 } },
    { probe = { tag = "probe", frequency = 432.0, phase = 3.141592653589793 }, mode = "point" },
    { probe = { tag = "probe", frequency = 105.0 }, mode = "line" },
]

[[tick]]
dt = 10000.0
"#;

    #[test]
    fn test_parse_defaults() {
        let s = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(s.ticks.len(), 2);
        assert_eq!(s.ticks[0].queries[0].mode, Mode::Point);
        assert_eq!(s.ticks[0].queries[2].mode, Mode::Line);
        assert_eq!(s.ticks[0].queries[2].probe.phase(), 0.0);
        assert!(s.ticks[1].inserts.is_empty());
    }

    #[test]
    fn test_replay_reference_scenario() {
        let s = Scenario::parse(SCENARIO).unwrap();
        let mut index = BucketIndex::default();
        let reports = s.replay(&mut index).unwrap();

        let first = &reports[0];
        assert_eq!(first.inserted, 2);
        assert_eq!(first.overwritten, 0);
        assert_eq!(first.population, 2);
        assert_eq!(first.queries[0].matches[0].root_tag(), "A");
        assert!(first.queries[1].matches.is_empty());
        assert_eq!(first.queries[2].matches[0].root_tag(), "B");

        // one long sweep drains both records
        let second = &reports[1];
        assert_eq!(second.sweep.evicted, 2);
        assert_eq!(second.population, 0);
    }

    #[test]
    fn test_invalid_record_fails_parse() {
        let bad = r#"
[[tick]]
inserts = [{ tag = "A", frequency = 1.0, weight = -2.0 }]
"#;
        let err = Scenario::parse(bad).unwrap_err();
        assert!(err.to_string().contains("weight"), "{err}");
    }

    #[test]
    fn test_out_of_range_frequency_fails_parse() {
        let bad = "[[tick]]\ninserts = [{ tag = \"A\", frequency = 1e300 }]\n";
        let err = Scenario::parse(bad).unwrap_err();
        assert!(err.to_string().contains("frequency must be within"), "{err}");
    }

    #[test]
    fn test_phase_overflow_fails_replay() {
        let s = Scenario::parse(
            "[[tick]]\ndt = 1e300\ninserts = [{ tag = \"A\", frequency = 1e12, weight = 1e6 }]\n",
        )
        .unwrap();
        let mut index = BucketIndex::default();
        let err = s.replay(&mut index).unwrap_err();
        assert!(matches!(err, hs_core::IndexError::PhaseOverflow { .. }), "{err}");
        assert_eq!(index.population(), 1);
    }

    #[test]
    fn test_negative_dt_fails_replay() {
        let s = Scenario::parse("[[tick]]\ndt = -1.0\n").unwrap();
        let mut index = BucketIndex::default();
        assert!(s.replay(&mut index).is_err());
    }
}
