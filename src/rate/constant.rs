//! Flat rate function

use crate::error::{Error, Result};

use super::RateFunction;

/// A rate function that returns the same rate at every instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantRate {
    rate: u64,
}

impl ConstantRate {
    /// Create a constant rate of `rate` items per second.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `rate` is zero.
    pub fn new(rate: u64) -> Result<Self> {
        if rate == 0 {
            return Err(Error::invalid_argument("rate must be positive"));
        }
        Ok(Self { rate })
    }
}

impl RateFunction for ConstantRate {
    fn rate(&self, _elapsed_nanos: u64) -> u64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_rate_is_constant() {
        let rate = ConstantRate::new(500).unwrap();
        for t in [0, 1, 999, 1_000_000_000, u64::MAX] {
            assert_eq!(rate.rate(t), 500);
        }
    }

    #[test]
    fn test_constant_rate_rejects_zero() {
        assert!(matches!(
            ConstantRate::new(0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
