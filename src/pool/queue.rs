//! Concurrent bounded queue with eviction instead of backpressure

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// A bounded queue that makes room for new arrivals by discarding an
/// existing element instead of blocking the producer.
///
/// `put` never blocks and never rejects: when the queue is full it
/// evicts from the configured end (head = oldest, tail = newest) and
/// hands the evicted item back to the caller. `take` blocks only while
/// the queue is empty. A single mutex serializes both, and a not-empty
/// condition variable parks consumers; FIFO order holds among items
/// that survive eviction.
pub struct EvictingQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    capacity: usize,
    drop_from_head: bool,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> EvictingQueue<T> {
    /// Create a queue with the given capacity.
    ///
    /// `drop_from_head = true` evicts the oldest item when full, false
    /// evicts the newest.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize, drop_from_head: bool) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument("capacity must be at least 1"));
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            capacity,
            drop_from_head,
        })
    }

    /// Append an item, evicting one if the queue is full.
    ///
    /// Returns the evicted item, if any. Never blocks.
    pub fn put(&self, item: T) -> Option<T> {
        let mut inner = self.lock();
        let evicted = if inner.items.len() >= self.capacity {
            if self.drop_from_head {
                inner.items.pop_front()
            } else {
                inner.items.pop_back()
            }
        } else {
            None
        };
        inner.items.push_back(item);
        self.not_empty.notify_one();
        evicted
    }

    /// Remove and return the head item, blocking while the queue is empty.
    ///
    /// # Errors
    /// Returns `Error::Interrupted` if the queue is closed, including
    /// while a caller is parked waiting.
    pub fn take(&self) -> Result<T> {
        let mut inner = self.lock();
        loop {
            if inner.closed {
                return Err(Error::Interrupted("queue closed".into()));
            }
            if let Some(item) = inner.items.pop_front() {
                return Ok(item);
            }
            inner = self
                .not_empty
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the queue, waking every parked consumer.
    ///
    /// Idempotent; items still queued are dropped with the queue.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        self.not_empty.notify_all();
    }

    /// Whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Snapshot of the current item count
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A panicked peer must not wedge the queue, so poisoning is recovered
    // rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for EvictingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("EvictingQueue")
            .field("len", &inner.items.len())
            .field("capacity", &self.capacity)
            .field("drop_from_head", &self.drop_from_head)
            .field("closed", &inner.closed)
            .finish()
    }
}
