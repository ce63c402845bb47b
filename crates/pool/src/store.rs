//! Bounded per-key idle store

use std::collections::VecDeque;

/// Ordered, bounded store of idle instances for a single key.
///
/// The bound is fixed when the store is created; reconfiguring the pool's
/// capacity later never resizes an existing store.
pub(crate) struct IdleStore<S> {
    items: VecDeque<S>,
    bound: usize,
}

impl<S> IdleStore<S> {
    pub(crate) fn new(bound: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(bound),
            bound,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn bound(&self) -> usize {
        self.bound
    }

    /// Append `service` at the tail. Returns the instance back when the
    /// store is already at its bound.
    pub(crate) fn push(&mut self, service: S) -> Result<(), S> {
        if self.items.len() >= self.bound {
            return Err(service);
        }
        self.items.push_back(service);
        Ok(())
    }

    /// Remove and return the oldest idle instance.
    pub(crate) fn pop(&mut self) -> Option<S> {
        self.items.pop_front()
    }

    /// Consume the store, yielding its instances oldest-first.
    pub(crate) fn into_services(self) -> Vec<S> {
        self.items.into_iter().collect()
    }
}
