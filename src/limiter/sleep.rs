//! Wait strategies between token acquisition attempts

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a blocked [`TokenBucket::get`](super::TokenBucket::get) caller
/// waits before retrying.
///
/// `Busy` trades CPU for the lowest wake latency; the timed variants
/// trade progressively more latency for less CPU. Pick the coarsest
/// strategy the acquisition rate tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStrategy {
    /// Yield to the scheduler and retry immediately
    Busy,

    /// Sleep one nanosecond between attempts
    Nanos,

    /// Sleep one microsecond between attempts
    Micros,

    /// Sleep one millisecond between attempts
    Millis,
}

impl SleepStrategy {
    /// Pause the calling thread once, per the strategy
    pub fn pause(&self) {
        match self {
            SleepStrategy::Busy => thread::yield_now(),
            SleepStrategy::Nanos => thread::sleep(Duration::from_nanos(1)),
            SleepStrategy::Micros => thread::sleep(Duration::from_micros(1)),
            SleepStrategy::Millis => thread::sleep(Duration::from_millis(1)),
        }
    }
}
