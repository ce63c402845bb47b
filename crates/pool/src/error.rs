//! Error types for the service pool
use std::fmt;

use thiserror::Error;

/// Admission was refused because the key's idle store is already at capacity.
///
/// Returned only by
/// [`ServicePool::add_and_acquire`](crate::ServicePool::add_and_acquire).
/// The error carries the rejected key and service back to the caller, in the
/// manner of [`std::sync::mpsc::SendError`], so a refused instance is never
/// destroyed by the pool: the caller decides whether to retry later or close
/// the instance.
#[derive(Error)]
#[error("Service pool capacity exceeded for key {key:?}: {idle}/{capacity} idle")]
pub struct CapacityExceeded<K, S> {
    key: K,
    service: S,
    idle: usize,
    capacity: usize,
}

impl<K, S> CapacityExceeded<K, S> {
    pub(crate) fn new(key: K, service: S, idle: usize, capacity: usize) -> Self {
        Self {
            key,
            service,
            idle,
            capacity,
        }
    }

    /// The key whose idle store refused admission.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Number of idle instances observed for the key at admission.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Capacity in force when admission was refused.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recover the rejected service instance.
    #[must_use]
    pub fn into_service(self) -> S {
        self.service
    }

    /// Recover both the key and the rejected service instance.
    #[must_use]
    pub fn into_parts(self) -> (K, S) {
        (self.key, self.service)
    }
}

// The service payload is not required to be Debug and is dropped from the
// output on purpose.
impl<K: fmt::Debug, S> fmt::Debug for CapacityExceeded<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityExceeded")
            .field("key", &self.key)
            .field("idle", &self.idle)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
