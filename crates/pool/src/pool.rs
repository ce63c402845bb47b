//! Keyed service pool with bounded idle stores and coordinated shutdown.
//!
//! `ServicePool<K, S>` keeps one bounded FIFO store of idle `S` instances
//! per key. Callers take instances out with `acquire`, hand them back with
//! `release`, and register freshly created instances against the capacity
//! bound with `add_and_acquire`. `stop` drains every store and passes each
//! drained batch to the configured [`StopHandler`] exactly once.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::PoolConfig;
use crate::error::CapacityExceeded;
use crate::lifecycle::{BestEffortShutdown, PoolState, StopHandler, Stoppable};
use crate::store::IdleStore;

/// Registry of idle stores, guarded as a whole by the pool lock.
struct Registry<K, S> {
    stores: HashMap<K, IdleStore<S>>,
    capacity: usize,
    state: PoolState,
}

/// Inner shared state for the pool.
struct PoolInner<K, S> {
    registry: Mutex<Registry<K, S>>,
    stop_handler: Box<dyn StopHandler<S>>,
}

/// Keyed, capacity-bounded pool of reusable service instances.
///
/// All operations serialize on a single pool-wide lock and return without
/// waiting: an empty store is reported as absence, never by blocking. The
/// pool is a cheap-to-clone handle over shared state, so each thread can
/// hold its own copy.
///
/// Ownership of an instance transfers to the caller on a successful
/// [`acquire`](Self::acquire)/[`add_and_acquire`](Self::add_and_acquire)
/// and back to the pool on [`release`](Self::release). Instances held by
/// callers are invisible to the pool; [`stop`](Self::stop) only drains what
/// is idle.
pub struct ServicePool<K, S> {
    inner: Arc<PoolInner<K, S>>,
}

impl<K, S> Clone for ServicePool<K, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, S> fmt::Debug for ServicePool<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.lock();
        let size: usize = registry.stores.values().map(IdleStore::len).sum();
        f.debug_struct("ServicePool")
            .field("keys", &registry.stores.len())
            .field("size", &size)
            .field("capacity", &registry.capacity)
            .field("state", &registry.state)
            .finish()
    }
}

impl<K, S> ServicePool<K, S>
where
    K: Eq + Hash + fmt::Debug,
{
    /// Create a pool with the default stop behavior: each drained instance
    /// is stopped in place via [`Stoppable`].
    pub fn new(config: PoolConfig) -> Self
    where
        S: Stoppable,
    {
        Self::with_handler(config, BestEffortShutdown)
    }

    /// Create a pool that hands drained instances to `handler` on
    /// [`stop`](Self::stop).
    pub fn with_handler<H>(config: PoolConfig, handler: H) -> Self
    where
        H: StopHandler<S> + 'static,
    {
        Self {
            inner: Arc::new(PoolInner {
                registry: Mutex::new(Registry {
                    stores: HashMap::new(),
                    capacity: config.capacity,
                    state: PoolState::Stopped,
                }),
                stop_handler: Box::new(handler),
            }),
        }
    }

    /// Total number of idle instances across all keys.
    #[must_use]
    pub fn size(&self) -> usize {
        let registry = self.inner.registry.lock();
        registry.stores.values().map(IdleStore::len).sum()
    }

    /// Per-key capacity in force for admission checks and for stores
    /// created from now on.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.registry.lock().capacity
    }

    /// Reconfigure the per-key capacity.
    ///
    /// Applies to subsequent admission checks and to stores created after
    /// this call. Stores that already exist keep the bound they were
    /// created with, and instances already resident are never evicted.
    pub fn set_capacity(&self, capacity: usize) {
        self.inner.registry.lock().capacity = capacity;
    }

    /// Current lifecycle state.
    ///
    /// The state is diagnostic: operations are not gated on it, and a pool
    /// used before [`start`](Self::start) behaves like a started one.
    #[must_use]
    pub fn state(&self) -> PoolState {
        self.inner.registry.lock().state
    }

    /// Check if the pool is started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.state().is_started()
    }

    /// Take the oldest idle instance for `key`, if any.
    ///
    /// Returns `None` when no store exists for the key or the store is
    /// empty. Absence is a normal steady-state outcome, not an error; the
    /// caller falls back to creating a fresh instance (typically followed
    /// by [`add_and_acquire`](Self::add_and_acquire)).
    #[must_use]
    pub fn acquire(&self, key: &K) -> Option<S> {
        let mut registry = self.inner.registry.lock();
        let service = registry.stores.get_mut(key).and_then(IdleStore::pop);
        drop(registry);
        if service.is_some() {
            tracing::trace!(?key, "acquired idle service");
        } else {
            tracing::trace!(?key, "no idle service available");
        }
        service
    }

    /// Return an instance to `key`'s idle store, making it available for a
    /// future [`acquire`](Self::acquire).
    ///
    /// The instance is retained only if a store exists for the key and the
    /// store is below its bound; otherwise it is dropped. A release for a
    /// key the pool has never admitted is deliberately a no-op rather than
    /// creating a store, so that admission stays the only path that
    /// reserves capacity.
    pub fn release(&self, key: &K, service: S) {
        let mut registry = self.inner.registry.lock();
        let Some(store) = registry.stores.get_mut(key) else {
            drop(registry);
            tracing::debug!(?key, "released service for key with no idle store, dropping it");
            drop(service);
            return;
        };
        let bound = store.bound();
        match store.push(service) {
            Ok(()) => {
                drop(registry);
                tracing::trace!(?key, "service released back to idle store");
            }
            Err(service) => {
                // Unlock before the rejected instance's own Drop runs.
                drop(registry);
                tracing::warn!(?key, bound, "idle store at bound, dropping released service");
                drop(service);
            }
        }
    }

    /// Admit a freshly created instance for `key` and hand it straight back
    /// to the caller as in-use.
    ///
    /// Checks the key's current idle count against the capacity in force
    /// right now: at or above capacity the call fails with
    /// [`CapacityExceeded`], performs no mutation, and the error carries
    /// both key and service back to the caller. Below capacity the same
    /// instance is returned and a store is ensured for the key (created with
    /// today's capacity as its bound). The instance is *not* placed in the
    /// store; it only becomes eligible for reuse once the caller later calls
    /// [`release`](Self::release).
    pub fn add_and_acquire(&self, key: K, service: S) -> Result<S, CapacityExceeded<K, S>> {
        let mut registry = self.inner.registry.lock();
        let capacity = registry.capacity;
        let idle = registry.stores.get(&key).map_or(0, IdleStore::len);
        if idle >= capacity {
            tracing::debug!(?key, idle, capacity, "admission refused, idle store at capacity");
            return Err(CapacityExceeded::new(key, service, idle, capacity));
        }
        tracing::trace!(?key, idle, capacity, "service admitted");
        registry
            .stores
            .entry(key)
            .or_insert_with(|| IdleStore::new(capacity));
        Ok(service)
    }

    /// Mark the pool started.
    ///
    /// Pool contents are untouched; this is a lifecycle marker and
    /// diagnostic hook point.
    pub fn start(&self) {
        self.inner.registry.lock().state = PoolState::Started;
        tracing::debug!("service pool started");
    }

    /// Stop the pool: drain every idle store, hand each store's instances
    /// to the stop collaborator once, and clear the registry.
    ///
    /// The collaborator runs after the pool lock is released, so it may
    /// itself call back into the pool. Instances currently held by callers
    /// are not drained; closing those remains the caller's responsibility.
    /// Stopping an already-stopped pool finds an empty registry and invokes
    /// nothing.
    pub fn stop(&self) {
        let mut registry = self.inner.registry.lock();
        registry.state = PoolState::Stopped;
        let drained_stores: Vec<(K, IdleStore<S>)> = registry.stores.drain().collect();
        drop(registry);

        let keys = drained_stores.len();
        let mut drained = 0;
        for (_key, store) in drained_stores {
            let services = store.into_services();
            drained += services.len();
            self.inner.stop_handler.stop_all(services);
        }
        tracing::debug!(keys, drained, "service pool stopped");
    }
}

impl<K, S> Default for ServicePool<K, S>
where
    K: Eq + Hash + fmt::Debug,
    S: Stoppable,
{
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
