//! Pool lifecycle: observable state and the stop collaborator

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the current lifecycle state of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default)]
pub enum PoolState {
    /// Pool is not running; freshly created pools begin here
    #[default]
    Stopped,
    /// Pool has been started and is operational
    Started,
}

impl PoolState {
    /// Check if the pool is started
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Check if the pool is stopped
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Started => write!(f, "started"),
        }
    }
}

/// A pooled service that can be shut down in place.
///
/// Drives the default stop collaborator ([`BestEffortShutdown`]): every
/// instance drained by [`ServicePool::stop`](crate::ServicePool::stop) has
/// its `stop` called once.
pub trait Stoppable {
    /// Error reported when the instance fails to stop cleanly.
    type Error: fmt::Display;

    /// Stop the instance, releasing whatever it holds.
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Collaborator invoked with each drained idle store during pool shutdown.
///
/// Implementations must be best-effort: failing to stop one instance must
/// not prevent the remaining instances from being stopped, and `stop_all`
/// must not panic its way out of the drain.
pub trait StopHandler<S>: Send + Sync {
    /// Stop every service drained from one idle store.
    fn stop_all(&self, services: Vec<S>);
}

/// Default stop collaborator.
///
/// Stops each instance via [`Stoppable`] and reports failures at warn level
/// without propagating them.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestEffortShutdown;

impl<S: Stoppable> StopHandler<S> for BestEffortShutdown {
    fn stop_all(&self, services: Vec<S>) {
        for mut service in services {
            if let Err(err) = service.stop() {
                tracing::warn!(error = %err, "failed to stop pooled service");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        fail: bool,
        stops: Arc<AtomicUsize>,
    }

    impl Stoppable for Flaky {
        type Error = String;

        fn stop(&mut self) -> Result<(), String> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(String::from("refused to stop"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn default_state_is_stopped() {
        assert_eq!(PoolState::default(), PoolState::Stopped);
        assert!(PoolState::default().is_stopped());
        assert!(!PoolState::default().is_started());
    }

    #[test]
    fn state_display_names() {
        assert_eq!(PoolState::Stopped.to_string(), "stopped");
        assert_eq!(PoolState::Started.to_string(), "started");
    }

    #[test]
    fn best_effort_shutdown_stops_every_instance() {
        let stops = Arc::new(AtomicUsize::new(0));
        let make = |fail| Flaky {
            fail,
            stops: Arc::clone(&stops),
        };
        // The failing instance in the middle must not abort the rest.
        BestEffortShutdown.stop_all(vec![make(false), make(true), make(false)]);
        assert_eq!(stops.load(Ordering::SeqCst), 3);
    }
}
