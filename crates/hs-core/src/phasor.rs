use std::f64::consts::TAU;

use crate::constants::EPSILON;

/// Wrap an unwrapped angle into [0, 2π). Never negative.
pub fn normalize(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU, and returns
    // -0.0 for negative multiples of TAU
    if wrapped >= TAU || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Phase angle on the unit circle, always held in [0, 2π).
#[derive(Clone, Copy, Debug)]
pub struct Phasor {
    pub theta: f64,
}

impl Phasor {
    pub fn new(theta: f64) -> Self {
        Self {
            theta: normalize(theta),
        }
    }

    /// Phasor interference: cos(self.theta - other.theta).
    /// Range: [-1, +1]. +1 = in phase, -1 = out of phase.
    pub fn interference(self, other: Self) -> f64 {
        (self.theta - other.theta).cos()
    }

    /// Interference rescaled to [0, 1]: 1 when aligned, 0 in opposition.
    pub fn alignment(self, other: Self) -> f64 {
        (self.interference(other) + 1.0) / 2.0
    }

    /// Signed shortest-arc difference `other - self`, in [-π, π].
    pub fn delta(self, other: Self) -> f64 {
        let diff = other.theta - self.theta;
        if diff > std::f64::consts::PI {
            diff - TAU
        } else if diff < -std::f64::consts::PI {
            diff + TAU
        } else {
            diff
        }
    }
}

impl PartialEq for Phasor {
    fn eq(&self, other: &Self) -> bool {
        self.delta(*other).abs() < EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_phase_normalization() {
        let p = Phasor::new(-1.0);
        assert!(p.theta >= 0.0 && p.theta < TAU);
        assert!((p.theta - (TAU - 1.0)).abs() < 1e-12);

        let p2 = Phasor::new(10.0);
        assert!(p2.theta >= 0.0 && p2.theta < TAU);
    }

    #[test]
    fn test_normalize_tiny_negative_stays_below_tau() {
        let n = normalize(-1e-18);
        assert!(n < TAU, "normalize(-1e-18) = {n}");
        assert!(n >= 0.0);
    }

    #[test]
    fn test_normalize_exact_multiples() {
        assert_eq!(normalize(0.0), 0.0);
        assert!(normalize(TAU) < 1e-12);
        assert!(normalize(-TAU) < 1e-12);
        assert!(normalize(-TAU).is_sign_positive());
    }

    #[test]
    fn test_interference_in_phase() {
        let a = Phasor::new(1.0);
        let b = Phasor::new(1.0);
        assert!((a.interference(b) - 1.0).abs() < 1e-10);
        assert!((a.alignment(b) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_interference_out_of_phase() {
        let a = Phasor::new(0.0);
        let b = Phasor::new(PI);
        assert!((a.interference(b) - (-1.0)).abs() < 1e-10);
        assert!(a.alignment(b).abs() < 1e-10);
    }

    #[test]
    fn test_alignment_orthogonal_is_half() {
        let a = Phasor::new(0.0);
        let b = Phasor::new(FRAC_PI_2);
        assert!((a.alignment(b) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_delta_takes_shortest_arc() {
        let a = Phasor::new(0.1);
        let b = Phasor::new(TAU - 0.1);
        assert!((a.delta(b) - (-0.2)).abs() < 1e-10);
        assert!((b.delta(a) - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_eq_across_wrap() {
        assert_eq!(Phasor::new(0.0), Phasor::new(TAU));
        assert_ne!(Phasor::new(0.0), Phasor::new(0.5));
    }
}
