//! Rate functions: pure maps from elapsed time to a target rate
//!
//! A [`RateFunction`] answers one question: at `t` nanoseconds into the
//! run, how many items per second should the generator be offering?
//! All variants are immutable once constructed and deterministic given
//! the elapsed time alone, so the same function can drive repeated runs.
//!
//! Available shapes:
//!
//! - [`ConstantRate`] - a flat rate
//! - [`PeriodicRate`] - triangle, sine, and square waveforms over a
//!   configurable period
//! - [`SummingRate`] - pointwise sum of other rate functions, for
//!   layering a waveform on top of a baseline

mod constant;
mod periodic;
mod summing;

pub use constant::ConstantRate;
pub use periodic::PeriodicRate;
pub use summing::SummingRate;

/// A time-varying target rate in items per second.
///
/// Implementations must be deterministic given elapsed time only and
/// must never return a value that overflows when summed with peers
/// (composition uses saturating arithmetic regardless).
pub trait RateFunction: Send + Sync {
    /// Target rate in items/sec at `elapsed_nanos` since the run began
    fn rate(&self, elapsed_nanos: u64) -> u64;
}
