//! # Tarn Service Pool
//!
//! Keyed, capacity-bounded pooling of reusable service instances with a
//! coordinated stop phase.
//!
//! A [`ServicePool`] keeps one bounded FIFO store of idle instances per
//! key. Callers take instances with [`ServicePool::acquire`], hand them
//! back with [`ServicePool::release`], and register freshly created
//! instances against the per-key capacity with
//! [`ServicePool::add_and_acquire`]. [`ServicePool::stop`] drains every
//! store and passes each drained batch to a [`StopHandler`] exactly once;
//! the default handler stops instances in place via [`Stoppable`].
//!
//! ```
//! use tarn_pool::{PoolConfig, ServicePool, Stoppable};
//!
//! struct Conn;
//!
//! impl Stoppable for Conn {
//!     type Error = std::convert::Infallible;
//!     fn stop(&mut self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let pool = ServicePool::new(PoolConfig::with_capacity(8));
//! pool.start();
//!
//! // Nothing pooled yet for this key: create, then register against capacity.
//! assert!(pool.acquire(&"db").is_none());
//! let conn = pool.add_and_acquire("db", Conn)?;
//!
//! // Done with it: hand it back for reuse.
//! pool.release(&"db", conn);
//! assert_eq!(pool.size(), 1);
//!
//! // Shutdown stops every idle instance.
//! pool.stop();
//! assert_eq!(pool.size(), 0);
//! # Ok::<(), tarn_pool::CapacityExceeded<&'static str, Conn>>(())
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod pool;

mod store;

pub use config::{DEFAULT_CAPACITY, PoolConfig};
pub use error::CapacityExceeded;
pub use lifecycle::{BestEffortShutdown, PoolState, StopHandler, Stoppable};
pub use pool::ServicePool;
