/// Reference frequency band width in Hz
pub const BAND_WIDTH: f64 = 10.0;

/// Reference number of phase sectors (π/4 each)
pub const SECTOR_COUNT: u32 = 8;

/// Hyperbolic decay constant: weight loss per unit time is DECAY_RATE / (w + DECAY_EPSILON)
pub const DECAY_RATE: f64 = 0.05;

/// Softening term in the hyperbolic decay denominator
pub const DECAY_EPSILON: f64 = 0.1;

/// Traces at or below this weight are stale and get evicted on the next sweep
pub const EVICTION_FLOOR: f64 = 0.1;

/// Minimum affinity score for a point lookup to report a match
pub const ACCEPTANCE_THRESHOLD: f64 = 0.5;

/// Frequency affinity falloff: 1 / (1 + FREQUENCY_K * |Δf|)
pub const FREQUENCY_K: f64 = 0.5;

/// Band radius scanned on each side of the probe in SPACE mode
pub const SPACE_RADIUS: u32 = 5;

/// Tag prefix marking a stored trace
pub const TRACE_PREFIX: &str = "trace:";

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;

/// Largest accepted |frequency| in Hz
pub const MAX_FREQUENCY: f64 = 1e12;

/// Largest band index a quantizer may produce (2^53, exact in f64 and far from i64 overflow)
pub const MAX_BAND_INDEX: f64 = 9_007_199_254_740_992.0;
