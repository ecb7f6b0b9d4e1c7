//! Periodic waveform rate functions

use std::f64::consts::TAU;
use std::time::Duration;

use crate::error::{Error, Result};

use super::RateFunction;

/// Shape function of phase, evaluated once per rate query.
///
/// Receives the phase in `[0, 1)` and returns the target rate; negative
/// outputs are clamped to zero by the wrapping [`PeriodicRate`].
type Shape = Box<dyn Fn(f64) -> i64 + Send + Sync>;

/// A rate function that repeats a waveform over a fixed period.
///
/// The waveform itself is an injected shape closure of the phase, the
/// elapsed-time fraction within one period normalized to `[0, 1)`.
/// Construct one of the stock shapes with [`PeriodicRate::triangle`],
/// [`PeriodicRate::sine`], or [`PeriodicRate::square`].
pub struct PeriodicRate {
    period_nanos: u64,
    shape: Shape,
}

impl PeriodicRate {
    fn new(period: Duration, shape: Shape) -> Result<Self> {
        let period_nanos = period.as_nanos();
        if period_nanos == 0 {
            return Err(Error::invalid_argument("period must be positive"));
        }
        if period_nanos > u64::MAX as u128 {
            return Err(Error::invalid_argument("period too large"));
        }
        Ok(Self {
            period_nanos: period_nanos as u64,
            shape,
        })
    }

    /// Triangle wave: linear ramp `min -> max` over the first `left_side`
    /// fraction of the period, then `max -> min` over the remainder.
    ///
    /// Phase 0 sits on the ascending branch, so each period opens at `min`
    /// (when `left_side > 0`).
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` unless `left_side` is in `[0, 1)`
    /// and both `min` and `max` are positive.
    pub fn triangle(period: Duration, left_side: f64, min: u64, max: u64) -> Result<Self> {
        validate_left_side(left_side)?;
        if min == 0 || max == 0 {
            return Err(Error::invalid_argument("min and max must be positive"));
        }
        let (min, max) = (min as f64, max as f64);
        Self::new(
            period,
            Box::new(move |phase| {
                let value = if phase < left_side {
                    min + (max - min) * (phase / left_side)
                } else {
                    max - (max - min) * ((phase - left_side) / (1.0 - left_side))
                };
                value.round() as i64
            }),
        )
    }

    /// Sine wave: `offset + round(multiplier * sin(phase * 2π))`.
    ///
    /// A `multiplier` larger than `offset` produces negative troughs,
    /// which clamp to a rate of zero.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` unless `offset` is positive.
    pub fn sine(period: Duration, multiplier: i64, offset: u64) -> Result<Self> {
        if offset == 0 {
            return Err(Error::invalid_argument("offset must be positive"));
        }
        Self::new(
            period,
            Box::new(move |phase| {
                offset as i64 + (multiplier as f64 * (phase * TAU).sin()).round() as i64
            }),
        )
    }

    /// Square wave: `low` while phase is below `left_side`, `high` after.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` unless `left_side` is in `[0, 1)`
    /// and both `low` and `high` are positive.
    pub fn square(period: Duration, left_side: f64, low: u64, high: u64) -> Result<Self> {
        validate_left_side(left_side)?;
        if low == 0 || high == 0 {
            return Err(Error::invalid_argument("low and high must be positive"));
        }
        Self::new(
            period,
            Box::new(move |phase| {
                if phase < left_side {
                    low as i64
                } else {
                    high as i64
                }
            }),
        )
    }

    /// The configured period in nanoseconds
    pub fn period_nanos(&self) -> u64 {
        self.period_nanos
    }
}

impl RateFunction for PeriodicRate {
    fn rate(&self, elapsed_nanos: u64) -> u64 {
        let phase = (elapsed_nanos % self.period_nanos) as f64 / self.period_nanos as f64;
        (self.shape)(phase).max(0) as u64
    }
}

impl std::fmt::Debug for PeriodicRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicRate")
            .field("period_nanos", &self.period_nanos)
            .finish()
    }
}

fn validate_left_side(left_side: f64) -> Result<()> {
    if !(0.0..1.0).contains(&left_side) {
        return Err(Error::invalid_argument("left_side must be in [0, 1)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);
    const NANOS_PER_SEC: u64 = 1_000_000_000;

    #[test]
    fn test_triangle_endpoints() {
        let rate = PeriodicRate::triangle(SECOND, 0.5, 100, 1000).unwrap();
        // Phase 0 opens the ascending branch at min
        assert_eq!(rate.rate(0), 100);
        // Peak at the left_side boundary
        assert_eq!(rate.rate(NANOS_PER_SEC / 2), 1000);
        // Midway down the descending branch
        assert_eq!(rate.rate(3 * NANOS_PER_SEC / 4), 550);
    }

    #[test]
    fn test_triangle_zero_left_side_descends_from_max() {
        let rate = PeriodicRate::triangle(SECOND, 0.0, 100, 1000).unwrap();
        assert_eq!(rate.rate(0), 1000);
        assert_eq!(rate.rate(NANOS_PER_SEC / 2), 550);
    }

    #[test]
    fn test_sine_quarter_points() {
        let rate = PeriodicRate::sine(SECOND, 100, 500).unwrap();
        assert_eq!(rate.rate(0), 500);
        assert_eq!(rate.rate(NANOS_PER_SEC / 4), 600);
        assert_eq!(rate.rate(3 * NANOS_PER_SEC / 4), 400);
    }

    #[test]
    fn test_sine_negative_trough_clamps_to_zero() {
        // Multiplier dwarfs the offset, so the trough goes negative
        let rate = PeriodicRate::sine(SECOND, 1000, 10).unwrap();
        assert_eq!(rate.rate(3 * NANOS_PER_SEC / 4), 0);
    }

    #[test]
    fn test_square_switches_at_left_side() {
        let rate = PeriodicRate::square(SECOND, 0.25, 10, 90).unwrap();
        assert_eq!(rate.rate(0), 10);
        assert_eq!(rate.rate(NANOS_PER_SEC / 10), 10);
        assert_eq!(rate.rate(NANOS_PER_SEC / 2), 90);
    }

    #[test]
    fn test_periodicity() {
        let fns: Vec<PeriodicRate> = vec![
            PeriodicRate::triangle(SECOND, 0.3, 5, 50).unwrap(),
            PeriodicRate::sine(SECOND, 20, 100).unwrap(),
            PeriodicRate::square(SECOND, 0.5, 1, 2).unwrap(),
        ];
        for f in &fns {
            let period = f.period_nanos();
            assert_eq!(period, NANOS_PER_SEC);
            for t in [0, 123_456_789, NANOS_PER_SEC - 1] {
                for k in 1..4u64 {
                    assert_eq!(f.rate(t), f.rate(t + k * period));
                }
            }
        }
    }

    #[test]
    fn test_validation() {
        assert!(PeriodicRate::triangle(Duration::ZERO, 0.5, 1, 2).is_err());
        assert!(PeriodicRate::triangle(SECOND, 1.0, 1, 2).is_err());
        assert!(PeriodicRate::triangle(SECOND, -0.1, 1, 2).is_err());
        assert!(PeriodicRate::triangle(SECOND, 0.5, 0, 2).is_err());
        assert!(PeriodicRate::sine(SECOND, 10, 0).is_err());
        assert!(PeriodicRate::square(SECOND, 0.5, 0, 1).is_err());
    }
}
