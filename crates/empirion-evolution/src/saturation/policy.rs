//! Saturation policy: growth past the ceiling is clamped, growth at the ceiling is a no-op

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationPolicy {
    ceiling: f64,
}

impl SaturationPolicy {
    /// Non-finite or non-positive ceilings fall back to `f64::MAX`.
    pub fn new(ceiling: f64) -> Self {
        let ceiling = if ceiling.is_finite() && ceiling > 0.0 {
            ceiling
        } else {
            f64::MAX
        };
        Self { ceiling }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn is_saturated(&self, value: f64) -> bool {
        value >= self.ceiling
    }

    pub fn multiply(&self, value: f64, factor: f64) -> f64 {
        self.clamp(value, value * factor)
    }

    pub fn add(&self, value: f64, amount: f64) -> f64 {
        self.clamp(value, value + amount)
    }

    fn clamp(&self, current: f64, next: f64) -> f64 {
        if self.is_saturated(current) {
            return current;
        }
        if !next.is_finite() || next > self.ceiling {
            self.ceiling
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_below_ceiling() {
        let policy = SaturationPolicy::new(100.0);
        assert_eq!(policy.multiply(4.0, 2.0), 8.0);
    }

    #[test]
    fn test_multiply_clamps_to_ceiling() {
        let policy = SaturationPolicy::new(100.0);
        assert_eq!(policy.multiply(64.0, 2.0), 100.0);
        assert_eq!(policy.multiply(100.0, 2.0), 100.0);
    }

    #[test]
    fn test_add_clamps_to_ceiling() {
        let policy = SaturationPolicy::new(10.0);
        assert_eq!(policy.add(9.5, 1.0), 10.0);
        assert_eq!(policy.add(10.0, 1.0), 10.0);
    }

    #[test]
    fn test_overflow_to_infinity_is_clamped() {
        let policy = SaturationPolicy::new(f64::MAX);
        assert_eq!(policy.multiply(f64::MAX / 1.5, 2.0), f64::MAX);
    }

    #[test]
    fn test_invalid_ceiling_falls_back() {
        assert_eq!(SaturationPolicy::new(f64::NAN).ceiling(), f64::MAX);
        assert_eq!(SaturationPolicy::new(-1.0).ceiling(), f64::MAX);
    }
}
