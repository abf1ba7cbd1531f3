//! Phase-bucket associative memory index.
//!
//! Stores time-evolving oscillator traces (frequency, phase, decaying
//! weight) in a quantized `(frequency band, phase sector)` hash and
//! retrieves the closest trace to a probe without brute-force comparison.
//! Four retrieval resolutions form a precision ladder: POINT (3×3 fuzzy
//! neighbourhood), LINE (one band, full phase circle), PLANE (±1 band) and
//! SPACE (wide band window).
//!
//! Zero I/O: a single-process, in-memory engine rebuilt every run.

pub mod affinity;
pub mod config;
pub mod constants;
pub mod error;
pub mod index;
pub mod mode;
pub mod oscillator;
pub mod phasor;
pub mod quantizer;
pub mod shared;

pub use affinity::AffinityScorer;
pub use config::IndexConfig;
pub use constants::{
    ACCEPTANCE_THRESHOLD, BAND_WIDTH, DECAY_EPSILON, DECAY_RATE, EVICTION_FLOOR, FREQUENCY_K,
    MAX_BAND_INDEX, MAX_FREQUENCY, SECTOR_COUNT, SPACE_RADIUS, TRACE_PREFIX,
};
pub use error::{IndexError, Result};
pub use index::{BucketIndex, Resonance, SweepReport};
pub use mode::Mode;
pub use oscillator::OscillatorState;
pub use phasor::{Phasor, normalize};
pub use quantizer::{BucketKey, Quantizer};
pub use shared::SharedIndex;
