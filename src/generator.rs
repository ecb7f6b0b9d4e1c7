//! Generator: the rate-controlled scheduling loop
//!
//! The Generator is the core execution unit, responsible for the simple
//! but timing-critical loop: **query rate -> compute due -> pull -> emit
//! -> repeat**. It runs synchronously on the calling thread as a
//! non-cooperative busy loop reading a nanosecond clock each iteration;
//! its only pause is not emitting when no items are due. It never
//! sleeps, because a sleeping loop cannot hit sub-millisecond wake
//! latency. Callers who want it off their thread spawn a dedicated OS
//! thread for it.
//!
//! Pacing is drift-corrected: each tick computes how many items are due
//! from the elapsed time and the current rate, then advances its
//! internal clock by the time equivalent of the items actually due
//! rather than the raw elapsed interval. The fractional leftover
//! carries into the next tick, so cumulative drift stays under one
//! item-period instead of accumulating per-tick rounding error.
//!
//! # Example
//!
//! ```ignore
//! let rate = ConstantRate::new(1000)?;
//! let mut generator = Generator::new(source, Box::new(rate), worker);
//! let handle = generator.handle();
//!
//! // terminate from a timer thread for a time-bounded run
//! std::thread::spawn(move || {
//!     std::thread::sleep(Duration::from_secs(20));
//!     handle.terminate();
//! });
//!
//! let stats = generator.run()?;
//! println!("emitted: {}", stats.emitted);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rate::RateFunction;
use crate::traits::{DataSource, Worker};

/// Ticks shorter than this are skipped without emitting, so the loop
/// does not oversample the clock
const MIN_TICK_NANOS: u64 = 1_000;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Drives a [`DataSource`] into a [`Worker`] at the rate dictated by a
/// [`RateFunction`].
///
/// Lifecycle: Created -> Running (first [`run`](Generator::run)) ->
/// Terminated (external [`GeneratorHandle::terminate`], source
/// exhaustion, or a worker error). A terminated generator never touches
/// its source or worker again; a second `run` fails with
/// [`Error::InvalidState`].
pub struct Generator<S, W>
where
    S: DataSource,
    W: Worker<S::Item>,
{
    source: S,
    worker: W,
    rate_fn: Box<dyn RateFunction>,
    terminated: Arc<AtomicBool>,
    ran: bool,
}

/// Cloneable handle for terminating a generator from another thread.
///
/// `terminate` is idempotent and safe to call from any thread; the loop
/// observes the flag once per tick, so shutdown latency is bounded by
/// one scheduling granularity.
#[derive(Debug, Clone)]
pub struct GeneratorHandle {
    terminated: Arc<AtomicBool>,
}

impl GeneratorHandle {
    /// Request termination of the associated generator
    pub fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::AcqRel) {
            tracing::debug!("generator termination requested");
        }
    }

    /// Whether the generator has terminated (or been asked to)
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}

/// Summary of one generator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorStats {
    /// Wall-clock time the run began
    pub started_at: DateTime<Utc>,

    /// Items delivered to the worker
    pub emitted: u64,

    /// Total run duration
    pub elapsed: Duration,
}

impl GeneratorStats {
    /// Average delivered rate over the whole run, in items/sec
    pub fn items_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.emitted as f64 / secs
        } else {
            0.0
        }
    }
}

impl<S, W> Generator<S, W>
where
    S: DataSource,
    W: Worker<S::Item>,
{
    /// Create a generator over the given source, rate function, and worker
    pub fn new(source: S, rate_fn: Box<dyn RateFunction>, worker: W) -> Self {
        Self {
            source,
            worker,
            rate_fn,
            terminated: Arc::new(AtomicBool::new(false)),
            ran: false,
        }
    }

    /// Get a handle for terminating this generator from another thread
    pub fn handle(&self) -> GeneratorHandle {
        GeneratorHandle {
            terminated: Arc::clone(&self.terminated),
        }
    }

    /// Run the scheduling loop on the calling thread.
    ///
    /// Returns when terminated externally or by source exhaustion. An
    /// error from the worker is not caught: it halts the loop and
    /// propagates, since the generator cannot know whether partial
    /// progress occurred.
    ///
    /// # Errors
    /// `Error::InvalidState` if this generator already ran or was
    /// terminated before it ever did.
    pub fn run(&mut self) -> Result<GeneratorStats> {
        if self.ran || self.terminated.load(Ordering::Acquire) {
            return Err(Error::invalid_state(
                "generator already terminated; construct a new one",
            ));
        }
        self.ran = true;

        let started_at = Utc::now();
        let beginning = Instant::now();
        let mut previous: u64 = 0;
        let mut emitted: u64 = 0;

        tracing::debug!("generator started");

        'run: while !self.terminated.load(Ordering::Acquire) {
            let from_beginning = saturating_nanos(beginning.elapsed());
            let elapsed = from_beginning - previous;
            if elapsed < MIN_TICK_NANOS {
                continue;
            }

            let rate = self.rate_fn.rate(from_beginning);
            let due = (elapsed as u128 * rate as u128 / NANOS_PER_SEC) as u64;
            if due == 0 {
                // Not even one item's worth of time at this rate; the
                // fraction carries because `previous` stays put.
                continue;
            }

            // Advance by the time equivalent of the whole items due, not
            // by `elapsed`, so rounding error never accumulates.
            previous += (due as u128 * NANOS_PER_SEC / rate as u128) as u64;

            for _ in 0..due {
                if !self.source.has_next(from_beginning) {
                    tracing::info!(emitted, "data source exhausted, generator stopping");
                    self.terminated.store(true, Ordering::Release);
                    break 'run;
                }
                let item = self.source.next(from_beginning);
                match self.worker.accept(item) {
                    Ok(()) => emitted += 1,
                    Err(e) => {
                        self.terminated.store(true, Ordering::Release);
                        return Err(e);
                    }
                }
            }
        }

        self.terminated.store(true, Ordering::Release);
        let stats = GeneratorStats {
            started_at,
            emitted,
            elapsed: beginning.elapsed(),
        };
        tracing::debug!(
            emitted = stats.emitted,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "generator finished"
        );
        Ok(stats)
    }
}

impl<S, W> std::fmt::Debug for Generator<S, W>
where
    S: DataSource,
    W: Worker<S::Item>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("ran", &self.ran)
            .field("terminated", &self.terminated.load(Ordering::Acquire))
            .finish()
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
