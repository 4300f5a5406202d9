//! Bounded, mean-reverting random walk.
//!
//! ```text
//! next = clamp(current + U[lo, hi) + (target - current) * rate, bound_lo, bound_hi)
//! ```
//!
//! Reversion is linear; a rate of zero gives a plain bounded walk.

use rand::Rng;

use crate::error::{Result, SimError};

/// Closed interval `[lo, hi]` a walked scalar must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    lo: f64,
    hi: f64,
}

impl Bounds {
    /// Validated constructor. Non-finite ends or `lo > hi` are rejected.
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(SimError::DegenerateBounds { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Inclusive at both ends.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }
}

/// Parameters for one walked scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalk {
    /// Half-open noise range `[lo, hi)`.
    pub noise: (f64, f64),
    pub reversion_target: f64,
    pub reversion_rate: f64,
    pub bounds: Bounds,
}

impl RandomWalk {
    /// Walk with no mean reversion.
    pub fn unanchored(noise: (f64, f64), bounds: Bounds) -> Self {
        Self {
            noise,
            reversion_target: 0.0,
            reversion_rate: 0.0,
            bounds,
        }
    }

    pub fn reverting(noise: (f64, f64), target: f64, rate: f64, bounds: Bounds) -> Self {
        Self {
            noise,
            reversion_target: target,
            reversion_rate: rate,
            bounds,
        }
    }

    pub fn step<R: Rng + ?Sized>(&self, rng: &mut R, current: f64) -> f64 {
        step(
            rng,
            current,
            self.noise,
            self.reversion_target,
            self.reversion_rate,
            self.bounds,
        )
    }
}

/// Advance `current` by one noise draw plus linear reversion, then clamp.
///
/// A degenerate noise range (`lo == hi`) adds the constant `lo` and consumes
/// no randomness.
pub fn step<R: Rng + ?Sized>(
    rng: &mut R,
    current: f64,
    noise: (f64, f64),
    reversion_target: f64,
    reversion_rate: f64,
    bounds: Bounds,
) -> f64 {
    let (lo, hi) = noise;
    let offset = if lo < hi { rng.random_range(lo..hi) } else { lo };
    let next = current + offset + (reversion_target - current) * reversion_rate;
    bounds.clamp(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit() -> Bounds {
        Bounds::new(0.0, 100.0).unwrap()
    }

    #[test]
    fn test_bounds_rejects_inverted() {
        assert_eq!(
            Bounds::new(5.0, 1.0),
            Err(SimError::DegenerateBounds { lo: 5.0, hi: 1.0 })
        );
    }

    #[test]
    fn test_bounds_rejects_nan() {
        assert!(Bounds::new(f64::NAN, 1.0).is_err());
        assert!(Bounds::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_bounds_point_interval_allowed() {
        let b = Bounds::new(3.0, 3.0).unwrap();
        assert!(b.contains(3.0));
        assert_eq!(b.clamp(10.0), 3.0);
    }

    #[test]
    fn test_step_clamps_to_upper_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        let next = step(&mut rng, 99.0, (5.0, 6.0), 0.0, 0.0, unit());
        assert_eq!(next, 100.0);
    }

    #[test]
    fn test_step_clamps_to_lower_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        let next = step(&mut rng, 1.0, (-6.0, -5.0), 0.0, 0.0, unit());
        assert_eq!(next, 0.0);
    }

    #[test]
    fn test_degenerate_noise_is_constant_offset() {
        let mut rng = StdRng::seed_from_u64(7);
        let next = step(&mut rng, 50.0, (2.0, 2.0), 0.0, 0.0, unit());
        assert_eq!(next, 52.0);
    }

    #[test]
    fn test_reversion_is_linear() {
        let mut rng = StdRng::seed_from_u64(7);
        // Zero-width noise isolates the reversion term: 80 + (35 - 80) * 0.1 = 75.5
        let next = step(&mut rng, 80.0, (0.0, 0.0), 35.0, 0.1, unit());
        assert!((next - 75.5).abs() < 1e-12);
    }

    #[test]
    fn test_asymmetric_noise_drifts_up() {
        let walk = RandomWalk::unanchored((-0.5, 1.0), Bounds::new(0.0, 1e9).unwrap());
        let mut rng = StdRng::seed_from_u64(3);
        let mut v = 1000.0;
        for _ in 0..1000 {
            v = walk.step(&mut rng, v);
        }
        assert!(v > 1000.0, "expected upward drift, got {v}");
    }

    #[test]
    fn test_reverting_walk_stays_in_bounds() {
        let walk = RandomWalk::reverting((-6.0, 6.0), 35.0, 0.03, unit());
        let mut rng = StdRng::seed_from_u64(11);
        let mut v = 50.0;
        for _ in 0..10_000 {
            v = walk.step(&mut rng, v);
            assert!(unit().contains(v));
        }
    }
}
