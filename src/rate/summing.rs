//! Pointwise sum of rate functions

use crate::error::{Error, Result};

use super::RateFunction;

/// Sums the rates of its children at the same instant.
///
/// Useful for layering a waveform on top of a constant baseline, e.g.
/// a sine ripple over a floor rate.
pub struct SummingRate {
    children: Vec<Box<dyn RateFunction>>,
}

impl SummingRate {
    /// Create a summing rate over `children`.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `children` is empty.
    pub fn new(children: Vec<Box<dyn RateFunction>>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::invalid_argument(
                "summing rate requires at least one child",
            ));
        }
        Ok(Self { children })
    }

    /// Number of child rate functions
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no children (never true for a constructed value)
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl RateFunction for SummingRate {
    fn rate(&self, elapsed_nanos: u64) -> u64 {
        self.children
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.rate(elapsed_nanos)))
    }
}

impl std::fmt::Debug for SummingRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummingRate")
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::{ConstantRate, PeriodicRate};
    use std::time::Duration;

    #[test]
    fn test_sum_equals_children() {
        let a = ConstantRate::new(100).unwrap();
        let b = PeriodicRate::square(Duration::from_secs(1), 0.5, 10, 20).unwrap();
        let sum = SummingRate::new(vec![
            Box::new(a),
            Box::new(PeriodicRate::square(Duration::from_secs(1), 0.5, 10, 20).unwrap()),
        ])
        .unwrap();

        assert_eq!(sum.len(), 2);
        assert!(!sum.is_empty());
        for t in [0u64, 250_000_000, 750_000_000, 1_500_000_000] {
            assert_eq!(sum.rate(t), a.rate(t) + b.rate(t));
        }
    }

    #[test]
    fn test_empty_children_rejected() {
        assert!(matches!(
            SummingRate::new(vec![]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_saturating_sum() {
        let sum = SummingRate::new(vec![
            Box::new(ConstantRate::new(u64::MAX).unwrap()),
            Box::new(ConstantRate::new(1).unwrap()),
        ])
        .unwrap();
        assert_eq!(sum.rate(0), u64::MAX);
    }
}
