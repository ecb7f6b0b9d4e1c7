//! Drain thread pool over an evicting queue

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::traits::Worker;

use super::config::PoolConfig;
use super::queue::EvictingQueue;

/// Callback invoked with the cumulative dropped-item count after each
/// eviction
pub(super) type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Non-blocking [`Worker`] that defers to a delegate on a thread pool.
///
/// `accept` enqueues and returns immediately; a fixed pool of drain
/// threads forwards queued items to the delegate. When the bounded
/// queue is full an existing item is shed (never the producer blocked),
/// the dropped counter increments, and the overflow callback fires.
/// Delegate failures are caught and logged at the pool boundary so one
/// bad item cannot kill a drain thread.
///
/// Construct via [`AsyncWorkerBuilder`](super::AsyncWorkerBuilder).
pub struct AsyncWorker<T: Send + 'static> {
    queue: Arc<EvictingQueue<T>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
    dropped: AtomicU64,
    on_overflow: Option<OverflowCallback>,
}

impl<T: Send + 'static> AsyncWorker<T> {
    pub(super) fn spawn(
        delegate: Arc<dyn Worker<T>>,
        config: PoolConfig,
        on_overflow: Option<OverflowCallback>,
    ) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(EvictingQueue::new(
            config.queue_capacity,
            config.drop_from_head,
        )?);

        let mut handles = Vec::with_capacity(config.pool_size);
        for i in 0..config.pool_size {
            let queue = Arc::clone(&queue);
            let delegate = Arc::clone(&delegate);
            let handle = thread::Builder::new()
                .name(format!("drain-{i}"))
                .spawn(move || drain_loop(i, &queue, &*delegate))?;
            handles.push(handle);
        }

        tracing::debug!(
            pool_size = config.pool_size,
            queue_capacity = config.queue_capacity,
            drop_from_head = config.drop_from_head,
            "drain pool started"
        );

        Ok(Self {
            queue,
            handles: Mutex::new(handles),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            on_overflow,
        })
    }

    /// Total items shed since the pool started
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    /// Items currently queued awaiting a drain thread
    pub fn backlog(&self) -> usize {
        self.queue.len()
    }

    /// Stop admitting items, wake every drain thread, and join them.
    ///
    /// Idempotent and safe to call from any thread, including
    /// concurrently with ongoing `accept` calls. Items still queued
    /// when close begins are discarded.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.queue.close();

        let handles = std::mem::take(
            &mut *self
                .handles
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let count = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("drain thread panicked");
            }
        }
        tracing::debug!(
            threads = count,
            dropped = self.dropped(),
            "drain pool closed"
        );
    }
}

impl<T: Send + 'static> Worker<T> for AsyncWorker<T> {
    /// Enqueue an item; always returns immediately.
    ///
    /// # Errors
    /// `Error::InvalidState` after [`close`](AsyncWorker::close).
    fn accept(&self, item: T) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::invalid_state("drain pool is closed"));
        }
        if let Some(evicted) = self.queue.put(item) {
            drop(evicted);
            let total = self.dropped.fetch_add(1, Ordering::AcqRel) + 1;
            if let Some(callback) = &self.on_overflow {
                callback(total);
            }
        }
        Ok(())
    }
}

impl<T: Send + 'static> Drop for AsyncWorker<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Send + 'static> std::fmt::Debug for AsyncWorker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWorker")
            .field("backlog", &self.queue.len())
            .field("capacity", &self.queue.capacity())
            .field("dropped", &self.dropped())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

/// Body of one drain thread: take until the queue closes, forwarding
/// each item to the delegate
fn drain_loop<T: Send>(id: usize, queue: &EvictingQueue<T>, delegate: &dyn Worker<T>) {
    tracing::debug!(drain_id = id, "drain thread started");
    loop {
        match queue.take() {
            Ok(item) => {
                if let Err(e) = delegate.accept(item) {
                    tracing::warn!(drain_id = id, error = %e, "delegate failed, item discarded");
                }
            }
            // Closed queue: time to exit
            Err(_) => break,
        }
    }
    tracing::debug!(drain_id = id, "drain thread exiting");
}
