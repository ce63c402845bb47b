//! Pool configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-key capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// Configuration for a [`ServicePool`](crate::ServicePool).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    /// Upper bound on idle instances retained per key.
    pub capacity: usize,
}

impl PoolConfig {
    /// Configuration with the given per-key capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
