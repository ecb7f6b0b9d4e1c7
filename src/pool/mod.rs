//! Drain pool: decoupling a slow consumer from the timing-critical loop
//!
//! [`AsyncWorker`] makes a possibly slow or blocking delegate
//! [`Worker`](crate::Worker) safe to call from a generator's scheduling
//! loop. Its `accept` never blocks: it enqueues onto a bounded
//! [`EvictingQueue`], and a fixed pool of background drain threads
//! forwards queued items to the real delegate. Under sustained overload
//! the queue sheds items (drop-oldest by default) instead of applying
//! backpressure to the loop: offered load is preserved, delivery is
//! not guaranteed.
//!
//! # Example
//!
//! ```ignore
//! let pool = AsyncWorkerBuilder::new()
//!     .delegate(publisher)
//!     .config(PoolConfig::new(4, 1024))
//!     .on_overflow(|dropped| tracing::warn!(dropped, "shedding load"))
//!     .build()?;
//!
//! // from the generator loop: returns immediately, always
//! pool.accept(item)?;
//!
//! pool.close();
//! ```

mod builder;
mod config;
mod executor;
mod queue;

pub use builder::AsyncWorkerBuilder;
pub use config::PoolConfig;
pub use executor::AsyncWorker;
pub use queue::EvictingQueue;
