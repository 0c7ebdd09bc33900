//! Background purge of idle rate-limiter clients.
//!
//! The counter store never forgets a client on its own; without a bound the
//! map grows for the process lifetime. The sweeper runs on a tokio interval
//! and drops clients that have been idle past a configured duration, leaving
//! active clients' window state untouched.

use std::time::Duration;

use tracing::debug;

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, WindowStore};

/// Configuration for the idle sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep.
    pub interval: Duration,
    /// Idle duration after which a client is dropped.
    pub max_idle: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            max_idle: Duration::from_secs(3600),
        }
    }
}

/// Periodically drops idle clients from a window store.
pub struct IdleSweeper<S>
where
    S: WindowStore + Clone,
{
    store: S,
    clock: std::sync::Arc<dyn Clock>,
    config: SweeperConfig,
    metrics: Metrics,
}

impl<S> IdleSweeper<S>
where
    S: WindowStore + Clone,
{
    /// Create a new sweeper over the given store.
    pub fn new(
        store: S,
        clock: std::sync::Arc<dyn Clock>,
        config: SweeperConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            metrics,
        }
    }

    /// Run one sweep immediately. Returns how many clients were dropped.
    pub fn sweep_once(&self) -> usize {
        let dropped = self
            .store
            .purge_idle(self.config.max_idle, self.clock.now());
        if dropped > 0 {
            self.metrics.record_evictions(dropped as u64);
            debug!(dropped, "idle clients swept");
        }
        dropped
    }

    /// Start sweeping periodically.
    ///
    /// This spawns a background task that sweeps at the configured interval
    /// until the returned handle is aborted or dropped by the caller.
    pub fn start(self) -> tokio::task::JoinHandle<()>
    where
        S: Send + Sync + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);

            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::limiter::{RateLimitConfig, RateLimiter};
    use crate::domain::client::ClientKey;
    use crate::infrastructure::counters::CounterStore;
    use crate::infrastructure::mocks::MockClock;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_sweep_once_drops_only_idle_clients() {
        let store = Arc::new(CounterStore::new());
        let clock = Arc::new(MockClock::new(Instant::now()));
        let metrics = Metrics::new();
        let limiter = RateLimiter::new(
            Arc::clone(&store),
            clock.clone(),
            RateLimitConfig::default(),
            metrics.clone(),
        );

        limiter.evaluate(&ClientKey::from("10.0.0.1"));
        clock.advance(Duration::from_secs(1800));
        limiter.evaluate(&ClientKey::from("10.0.0.2"));
        clock.advance(Duration::from_secs(1800));

        let sweeper = IdleSweeper::new(
            Arc::clone(&store),
            clock.clone(),
            SweeperConfig {
                interval: Duration::from_secs(300),
                max_idle: Duration::from_secs(3600),
            },
            metrics.clone(),
        );

        // Client 1 is 3600s idle, client 2 only 1800s.
        assert_eq!(sweeper.sweep_once(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(metrics.clients_evicted(), 1);
    }

    #[tokio::test]
    async fn test_background_sweep() {
        let store = Arc::new(CounterStore::new());
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = RateLimiter::new(
            Arc::clone(&store),
            clock.clone(),
            RateLimitConfig::default(),
            Metrics::new(),
        );

        limiter.evaluate(&ClientKey::from("10.0.0.1"));
        clock.advance(Duration::from_secs(7200));

        let sweeper = IdleSweeper::new(
            Arc::clone(&store),
            clock.clone(),
            SweeperConfig {
                interval: Duration::from_millis(10),
                max_idle: Duration::from_secs(3600),
            },
            Metrics::new(),
        );
        let handle = sweeper.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(store.is_empty());
    }
}
