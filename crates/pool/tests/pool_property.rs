//! Property tests holding the pool to a reference model.
//!
//! Drives random operation sequences against `ServicePool` and an in-test
//! model of the per-key bounded FIFO stores, checking sizes and outcomes
//! after every step, then stops the pool and checks the drained instances
//! against the model's remaining contents.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use tarn_pool::{PoolConfig, ServicePool, StopHandler};

// ---------------------------------------------------------------------------
// Recording stop handler
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Recording {
    batches: Arc<Mutex<Vec<Vec<u32>>>>,
}

impl Recording {
    fn all(&self) -> Vec<u32> {
        self.batches.lock().iter().flatten().copied().collect()
    }

    fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }
}

impl StopHandler<u32> for Recording {
    fn stop_all(&self, services: Vec<u32>) {
        self.batches.lock().push(services);
    }
}

// ---------------------------------------------------------------------------
// Reference model: per-key bounded FIFO stores
// ---------------------------------------------------------------------------

struct ModelStore {
    bound: usize,
    items: VecDeque<u32>,
}

struct Model {
    capacity: usize,
    stores: HashMap<u8, ModelStore>,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            stores: HashMap::new(),
        }
    }

    fn acquire(&mut self, key: u8) -> Option<u32> {
        self.stores
            .get_mut(&key)
            .and_then(|store| store.items.pop_front())
    }

    fn release(&mut self, key: u8, id: u32) {
        if let Some(store) = self.stores.get_mut(&key) {
            if store.items.len() < store.bound {
                store.items.push_back(id);
            }
        }
    }

    /// Admission per the current capacity; creates the store on success.
    fn admit(&mut self, key: u8) -> bool {
        let idle = self.stores.get(&key).map_or(0, |store| store.items.len());
        if idle >= self.capacity {
            return false;
        }
        let capacity = self.capacity;
        self.stores.entry(key).or_insert_with(|| ModelStore {
            bound: capacity,
            items: VecDeque::new(),
        });
        true
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    fn size(&self) -> usize {
        self.stores.values().map(|store| store.items.len()).sum()
    }

    fn store_count(&self) -> usize {
        self.stores.len()
    }

    fn drain_all(self) -> Vec<u32> {
        self.stores
            .into_values()
            .flat_map(|store| store.items)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Acquire(u8),
    Release(u8),
    AddAcquire(u8),
    SetCapacity(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3).prop_map(Op::Acquire),
        (0u8..3).prop_map(Op::Release),
        (0u8..3).prop_map(Op::AddAcquire),
        (0usize..4).prop_map(Op::SetCapacity),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn pool_matches_reference_model(
        capacity in 0usize..4,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let recording = Recording::default();
        let pool = ServicePool::with_handler(
            PoolConfig::with_capacity(capacity),
            recording.clone(),
        );
        pool.start();
        let mut model = Model::new(capacity);
        let mut next_id = 0u32;

        for op in &ops {
            match op {
                Op::Acquire(key) => {
                    prop_assert_eq!(pool.acquire(key), model.acquire(*key));
                }
                Op::Release(key) => {
                    let id = next_id;
                    next_id += 1;
                    pool.release(key, id);
                    model.release(*key, id);
                }
                Op::AddAcquire(key) => {
                    let id = next_id;
                    next_id += 1;
                    let admitted = model.admit(*key);
                    match pool.add_and_acquire(*key, id) {
                        Ok(returned) => {
                            prop_assert!(admitted, "pool admitted where the model refused");
                            prop_assert_eq!(returned, id);
                        }
                        Err(err) => {
                            prop_assert!(!admitted, "pool refused where the model admitted");
                            let (key_back, service_back) = err.into_parts();
                            prop_assert_eq!(key_back, *key);
                            prop_assert_eq!(service_back, id);
                        }
                    }
                }
                Op::SetCapacity(capacity) => {
                    pool.set_capacity(*capacity);
                    model.set_capacity(*capacity);
                }
            }

            // INVARIANT: idle counts agree after every operation.
            prop_assert_eq!(pool.size(), model.size());
        }

        // Drain and compare: one batch per store, every idle instance
        // delivered exactly once.
        let stores = model.store_count();
        pool.stop();
        prop_assert_eq!(pool.size(), 0);
        prop_assert_eq!(recording.batch_count(), stores);

        let mut expected = model.drain_all();
        let mut drained = recording.all();
        expected.sort_unstable();
        drained.sort_unstable();
        prop_assert_eq!(drained, expected);
    }
}

/// Deterministic check: FIFO reuse survives interleaved release/acquire.
#[test]
fn interleaved_release_acquire_stays_fifo() {
    let pool = ServicePool::with_handler(PoolConfig::with_capacity(4), Recording::default());
    let seed = pool.add_and_acquire(0u8, 100u32).expect("admission under capacity");
    pool.release(&0, seed);
    pool.release(&0, 101);
    assert_eq!(pool.acquire(&0), Some(100));
    pool.release(&0, 102);
    assert_eq!(pool.acquire(&0), Some(101));
    assert_eq!(pool.acquire(&0), Some(102));
    assert_eq!(pool.acquire(&0), None);
}

/// Deterministic check: a key the pool has never seen yields absence, and
/// an emptied key yields absence again.
#[test]
fn absence_for_unknown_and_emptied_keys() {
    let pool = ServicePool::with_handler(PoolConfig::default(), Recording::default());
    assert_eq!(pool.acquire(&9u8), None);

    let seed = pool.add_and_acquire(9u8, 1u32).expect("admission under capacity");
    pool.release(&9, seed);
    assert_eq!(pool.acquire(&9), Some(1));
    assert_eq!(pool.acquire(&9), None);
}
