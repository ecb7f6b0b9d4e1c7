//! Core contracts for item sources and consumers
//!
//! These traits are the two stable seams at the crate boundary. Concrete
//! adapters (CSV readers, random payload generators, broker publishers)
//! live in their own crates and only need to satisfy these contracts to
//! plug into a [`Generator`](crate::Generator).

use crate::error::Result;

/// Supplies the items a generator emits.
///
/// Both methods receive the elapsed nanoseconds since the generator's run
/// began, so time-aware sources (e.g. replaying a recorded trace) can
/// position their cursor without keeping their own clock.
pub trait DataSource: Send {
    /// The item type this source produces
    type Item: Send;

    /// Whether another item is available at the given elapsed time.
    ///
    /// This is a pure query; it must not advance the cursor.
    fn has_next(&self, elapsed_nanos: u64) -> bool;

    /// Produce the next item, advancing the cursor.
    ///
    /// Calling past exhaustion is a contract violation; implementations
    /// must panic rather than return stale or fabricated data.
    fn next(&mut self, elapsed_nanos: u64) -> Self::Item;
}

/// Consumes items emitted by a generator.
///
/// `accept` may block (synchronous backpressure) or return immediately,
/// as [`AsyncWorker`](crate::AsyncWorker) does. An `Err` from a worker
/// called directly by the generator aborts the scheduling loop.
pub trait Worker<T>: Send + Sync {
    /// Consume one item
    fn accept(&self, item: T) -> Result<()>;
}

impl<T, F> Worker<T> for F
where
    F: Fn(T) -> Result<()> + Send + Sync,
{
    fn accept(&self, item: T) -> Result<()> {
        self(item)
    }
}
