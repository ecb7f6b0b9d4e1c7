//! Drain pool configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sizing and eviction policy for an [`AsyncWorker`](super::AsyncWorker).
///
/// There is no universally-correct default for pool or queue sizing
/// (call sites that shed load differ too much), so both are required
/// constructor arguments, validated only. `drop_from_head` defaults to
/// true (shed the oldest item to make room for the newest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of drain threads
    pub pool_size: usize,

    /// Bounded queue capacity
    pub queue_capacity: usize,

    /// Evict from the head (oldest) when full; false evicts the newest
    #[serde(default = "default_drop_from_head")]
    pub drop_from_head: bool,
}

fn default_drop_from_head() -> bool {
    true
}

impl PoolConfig {
    /// Create a config with the given pool size and queue capacity
    pub fn new(pool_size: usize, queue_capacity: usize) -> Self {
        Self {
            pool_size,
            queue_capacity,
            drop_from_head: true,
        }
    }

    /// Set the eviction end
    pub fn with_drop_from_head(mut self, drop_from_head: bool) -> Self {
        self.drop_from_head = drop_from_head;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::invalid_argument("pool_size must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::invalid_argument(
                "queue_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_valid() {
        assert!(PoolConfig::new(3, 128).validate().is_ok());
    }

    #[test]
    fn test_config_zero_pool_size() {
        assert!(PoolConfig::new(0, 128).validate().is_err());
    }

    #[test]
    fn test_config_zero_capacity() {
        assert!(PoolConfig::new(3, 0).validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = PoolConfig::new(2, 64).with_drop_from_head(false);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PoolConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.pool_size, 2);
        assert_eq!(deserialized.queue_capacity, 64);
        assert!(!deserialized.drop_from_head);
    }

    #[test]
    fn test_config_drop_from_head_defaults_true() {
        let config: PoolConfig =
            serde_json::from_str(r#"{"pool_size": 1, "queue_capacity": 10}"#).unwrap();
        assert!(config.drop_from_head);
    }
}
