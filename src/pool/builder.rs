//! Builder pattern for AsyncWorker construction

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::Worker;

use super::config::PoolConfig;
use super::executor::{AsyncWorker, OverflowCallback};

/// Builder for creating [`AsyncWorker`] instances
///
/// Validates on `build` and reports the first missing required field.
///
/// # Example
/// ```ignore
/// let pool = AsyncWorkerBuilder::new()
///     .delegate(delegate)
///     .config(PoolConfig::new(3, 256))
///     .on_overflow(|dropped| tracing::warn!(dropped, "shedding"))
///     .build()?;
/// ```
pub struct AsyncWorkerBuilder<T: Send + 'static> {
    delegate: Option<Arc<dyn Worker<T>>>,
    config: Option<PoolConfig>,
    on_overflow: Option<OverflowCallback>,
}

impl<T: Send + 'static> AsyncWorkerBuilder<T> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            delegate: None,
            config: None,
            on_overflow: None,
        }
    }

    /// Set the delegate worker the drain threads feed
    pub fn delegate(mut self, delegate: Arc<dyn Worker<T>>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Set pool sizing and eviction policy
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the callback fired with the cumulative dropped count on each
    /// eviction
    pub fn on_overflow(mut self, callback: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_overflow = Some(Arc::new(callback));
        self
    }

    /// Build the pool, spawning its drain threads.
    ///
    /// # Errors
    /// `Error::InvalidArgument` if a required field is missing or the
    /// config fails validation.
    pub fn build(self) -> Result<AsyncWorker<T>> {
        let delegate = self
            .delegate
            .ok_or_else(|| missing_field("delegate"))?;
        let config = self.config.ok_or_else(|| missing_field("config"))?;

        AsyncWorker::spawn(delegate, config, self.on_overflow)
    }
}

impl<T: Send + 'static> Default for AsyncWorkerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_field(name: &str) -> Error {
    Error::invalid_argument(format!("missing required field: {name}"))
}
