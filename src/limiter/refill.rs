//! Token refill strategies

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Decides how many tokens have accrued since the last refill.
///
/// Called under the bucket lock on every acquisition attempt, so
/// implementations should be cheap; expensive bookkeeping belongs
/// behind the scheduled-refill guard.
pub trait RefillStrategy: Send {
    /// Tokens accrued since the last call
    fn refill(&mut self) -> u64;
}

/// Grants tokens at a fixed rate with drift-corrected accounting.
///
/// Works the same way the generator paces emission: tokens earned are
/// computed from the elapsed time since the last refill, but the
/// internal clock advances only by the time equivalent of the whole
/// tokens actually granted, so fractional remainders carry instead of
/// being lost. Each call grants at most one second's worth of tokens,
/// and calls arriving before the next scheduled refill instant grant
/// nothing.
#[derive(Debug)]
pub struct FixedRateRefillStrategy {
    tokens_per_second: u64,
    period_nanos: u64,
    origin: Instant,
    last_refill_nanos: u64,
    next_refill_nanos: u64,
}

impl FixedRateRefillStrategy {
    /// Create a strategy granting `tokens_per_second`, checked at most
    /// once per `refill_period`.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if either argument is zero.
    pub fn new(tokens_per_second: u64, refill_period: Duration) -> Result<Self> {
        if tokens_per_second == 0 {
            return Err(Error::invalid_argument(
                "tokens_per_second must be positive",
            ));
        }
        let period_nanos = refill_period.as_nanos();
        if period_nanos == 0 {
            return Err(Error::invalid_argument("refill_period must be positive"));
        }
        if period_nanos > u64::MAX as u128 {
            return Err(Error::invalid_argument("refill_period too large"));
        }
        Ok(Self {
            tokens_per_second,
            period_nanos: period_nanos as u64,
            origin: Instant::now(),
            last_refill_nanos: 0,
            next_refill_nanos: 0,
        })
    }

    /// Refill as of `now_nanos` since the strategy's origin.
    ///
    /// Separated from the clock so the accounting is testable.
    fn refill_at(&mut self, now_nanos: u64) -> u64 {
        if now_nanos < self.next_refill_nanos {
            return 0;
        }

        let elapsed = now_nanos - self.last_refill_nanos;
        let earned = (elapsed as u128 * self.tokens_per_second as u128 / NANOS_PER_SEC) as u64;
        // At most one second's worth per call; a long stall pays out
        // over successive refills instead of one burst.
        let granted = earned.min(self.tokens_per_second);

        // Advance only by the time equivalent of the whole tokens
        // granted; the fractional remainder stays behind `last_refill`.
        self.last_refill_nanos +=
            (granted as u128 * NANOS_PER_SEC / self.tokens_per_second as u128) as u64;
        self.next_refill_nanos = self.last_refill_nanos + self.period_nanos;

        granted
    }
}

impl RefillStrategy for FixedRateRefillStrategy {
    fn refill(&mut self) -> u64 {
        let now = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.refill_at(now)
    }
}
