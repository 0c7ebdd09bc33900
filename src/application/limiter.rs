//! Per-client admission decisions.
//!
//! Each client carries two independent counters - a minute window and an
//! hour window. An evaluation purges both, rejects on the first exceeded
//! ceiling without recording the attempt, and otherwise records the request
//! in both windows. Quota introspection reuses the same purge-then-count
//! arithmetic on a snapshot and never mutates state.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, WindowStore};
use crate::domain::client::ClientKey;
use crate::domain::error::{Error, Result};

pub use crate::domain::window::LimitScope;

/// Request ceilings for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Ceiling for the 60-second window.
    pub requests_per_minute: u32,
    /// Ceiling for the 3600-second window.
    pub requests_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            requests_per_hour: 1000,
        }
    }
}

/// Outcome of one admission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Admit the request.
    Allow,
    /// Reject the request; the attempt was not recorded.
    Limit(LimitScope),
}

impl Decision {
    /// Check if this decision is Allow.
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Check if this decision is a rejection.
    pub fn is_limited(&self) -> bool {
        matches!(self, Decision::Limit(_))
    }

    /// The rejection reason, if rejected.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::Limit(scope) => Some(scope.reason()),
        }
    }

    /// Convert to a `Result` for callers preferring `?` flow.
    ///
    /// # Errors
    /// Returns `Error::RateLimited` when the decision is a rejection.
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Limit(scope) => Err(Error::RateLimited { scope }),
        }
    }
}

/// Remaining quota for a client.
///
/// Reset instants are the oldest surviving timestamp plus the window length;
/// an empty window resets "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    /// Requests left in the minute window.
    pub minute_remaining: u32,
    /// Requests left in the hour window.
    pub hour_remaining: u32,
    /// When the minute window next frees a slot.
    pub minute_resets_at: Instant,
    /// When the hour window next frees a slot.
    pub hour_resets_at: Instant,
}

/// Decides request admission per client key.
///
/// Generic over the window storage port; in production this is the
/// concurrent counter store, in tests anything implementing
/// [`WindowStore`].
#[derive(Clone)]
pub struct RateLimiter<S>
where
    S: WindowStore + Clone,
{
    store: S,
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
    metrics: Metrics,
}

impl<S> RateLimiter<S>
where
    S: WindowStore + Clone,
{
    /// Create a new rate limiter.
    pub fn new(store: S, clock: Arc<dyn Clock>, config: RateLimitConfig, metrics: Metrics) -> Self {
        Self {
            store,
            clock,
            config,
            metrics,
        }
    }

    /// Evaluate one request for a client.
    ///
    /// The minute window is checked before the hour window, and a rejected
    /// attempt is not recorded in either - retrying while limited does not
    /// push the reset time further out.
    ///
    /// # Performance
    /// This method is designed for the hot path: one sharded-map entry
    /// access, lazy purge bounded by the stale entries for this client, no
    /// I/O.
    pub fn evaluate(&self, client: &ClientKey) -> Decision {
        let now = self.clock.now();
        let per_minute = self.config.requests_per_minute as usize;
        let per_hour = self.config.requests_per_hour as usize;

        let decision = self.store.with_windows_mut(client, now, |windows| {
            windows.touch(now);

            if windows.minute.count(now) >= per_minute {
                return Decision::Limit(LimitScope::Minute);
            }
            if windows.hour.count(now) >= per_hour {
                return Decision::Limit(LimitScope::Hour);
            }

            windows.minute.record(now);
            windows.hour.record(now);
            Decision::Allow
        });

        match decision {
            Decision::Allow => self.metrics.record_allowed(),
            Decision::Limit(scope) => {
                self.metrics.record_limited();
                debug!(client = %client, scope = %scope, "request limited");
            }
        }

        decision
    }

    /// Remaining quota for a client. Pure read.
    ///
    /// Calling this any number of times leaves the counters untouched; a
    /// subsequent [`evaluate`](Self::evaluate) still sees the full
    /// unconsumed quota.
    pub fn remaining_quota(&self, client: &ClientKey) -> QuotaStatus {
        let now = self.clock.now();

        match self.store.snapshot(client) {
            Some(windows) => {
                let minute_used = windows.minute.occupancy(now);
                let hour_used = windows.hour.occupancy(now);

                QuotaStatus {
                    minute_remaining: self
                        .config
                        .requests_per_minute
                        .saturating_sub(minute_used as u32),
                    hour_remaining: self.config.requests_per_hour.saturating_sub(hour_used as u32),
                    minute_resets_at: windows.minute.resets_at(now),
                    hour_resets_at: windows.hour.resets_at(now),
                }
            }
            None => QuotaStatus {
                minute_remaining: self.config.requests_per_minute,
                hour_remaining: self.config.requests_per_hour,
                minute_resets_at: now,
                hour_resets_at: now,
            },
        }
    }

    /// The configured ceilings.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Get a reference to the window store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::counters::CounterStore;
    use crate::infrastructure::mocks::MockClock;
    use std::sync::Arc;
    use std::time::Duration;

    fn limiter(
        per_minute: u32,
        per_hour: u32,
    ) -> (RateLimiter<Arc<CounterStore>>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = RateLimiter::new(
            Arc::new(CounterStore::new()),
            clock.clone(),
            RateLimitConfig {
                requests_per_minute: per_minute,
                requests_per_hour: per_hour,
            },
            Metrics::new(),
        );
        (limiter, clock)
    }

    #[test]
    fn test_minute_ceiling() {
        let (limiter, _) = limiter(2, 100);
        let client = ClientKey::from("10.0.0.1");

        assert_eq!(limiter.evaluate(&client), Decision::Allow);
        assert_eq!(limiter.evaluate(&client), Decision::Allow);
        assert_eq!(
            limiter.evaluate(&client),
            Decision::Limit(LimitScope::Minute)
        );
        assert_eq!(
            limiter.evaluate(&client).reason(),
            Some("minute limit exceeded")
        );
    }

    #[test]
    fn test_hour_ceiling() {
        let (limiter, clock) = limiter(10, 15);
        let client = ClientKey::from("10.0.0.2");

        // Drain the hour budget across minute windows.
        for _ in 0..3 {
            for _ in 0..5 {
                assert!(limiter.evaluate(&client).is_allow());
            }
            clock.advance(Duration::from_secs(61));
        }

        assert_eq!(limiter.evaluate(&client), Decision::Limit(LimitScope::Hour));
        assert_eq!(
            limiter.evaluate(&client).reason(),
            Some("hour limit exceeded")
        );
    }

    #[test]
    fn test_minute_window_recovery() {
        let (limiter, clock) = limiter(2, 100);
        let client = ClientKey::from("10.0.0.3");

        limiter.evaluate(&client);
        limiter.evaluate(&client);
        assert!(limiter.evaluate(&client).is_limited());

        // The hour window still carries the entries, but the minute window
        // has rolled over.
        clock.advance(Duration::from_secs(61));
        assert_eq!(limiter.evaluate(&client), Decision::Allow);
    }

    #[test]
    fn test_rejected_attempts_not_recorded() {
        let (limiter, clock) = limiter(2, 100);
        let client = ClientKey::from("10.0.0.4");

        limiter.evaluate(&client);
        limiter.evaluate(&client);
        for _ in 0..10 {
            assert!(limiter.evaluate(&client).is_limited());
        }

        // Rejections did not extend the hour window's occupancy.
        clock.advance(Duration::from_secs(61));
        let quota = limiter.remaining_quota(&client);
        assert_eq!(quota.hour_remaining, 98);
    }

    #[test]
    fn test_clients_are_independent() {
        let (limiter, _) = limiter(1, 100);

        assert!(limiter.evaluate(&ClientKey::from("10.0.0.5")).is_allow());
        assert!(limiter.evaluate(&ClientKey::from("10.0.0.6")).is_allow());
        assert!(limiter.evaluate(&ClientKey::from("10.0.0.5")).is_limited());
    }

    #[test]
    fn test_remaining_quota_is_pure() {
        let (limiter, _) = limiter(5, 100);
        let client = ClientKey::from("10.0.0.7");

        limiter.evaluate(&client);

        let first = limiter.remaining_quota(&client);
        for _ in 0..10 {
            assert_eq!(limiter.remaining_quota(&client), first);
        }
        assert_eq!(first.minute_remaining, 4);
        assert_eq!(first.hour_remaining, 99);

        // Introspection consumed nothing.
        assert!(limiter.evaluate(&client).is_allow());
    }

    #[test]
    fn test_quota_for_unknown_client() {
        let (limiter, clock) = limiter(5, 100);
        let quota = limiter.remaining_quota(&ClientKey::from("203.0.113.1"));

        assert_eq!(quota.minute_remaining, 5);
        assert_eq!(quota.hour_remaining, 100);
        assert_eq!(quota.minute_resets_at, clock.now());
        assert_eq!(quota.hour_resets_at, clock.now());
    }

    #[test]
    fn test_quota_reset_instants() {
        let (limiter, clock) = limiter(5, 100);
        let client = ClientKey::from("10.0.0.8");

        let start = clock.now();
        limiter.evaluate(&client);
        clock.advance(Duration::from_secs(10));

        let quota = limiter.remaining_quota(&client);
        assert_eq!(quota.minute_resets_at, start + Duration::from_secs(60));
        assert_eq!(quota.hour_resets_at, start + Duration::from_secs(3600));
    }

    #[test]
    fn test_into_result() {
        let (limiter, _) = limiter(1, 100);
        let client = ClientKey::from("10.0.0.9");

        assert!(limiter.evaluate(&client).into_result().is_ok());
        assert_eq!(
            limiter.evaluate(&client).into_result().unwrap_err(),
            Error::RateLimited {
                scope: LimitScope::Minute
            }
        );
    }

    #[test]
    fn test_metrics_track_decisions() {
        let (limiter, _) = limiter(2, 100);
        let client = ClientKey::from("10.0.0.10");

        for _ in 0..5 {
            limiter.evaluate(&client);
        }

        assert_eq!(limiter.metrics().requests_allowed(), 2);
        assert_eq!(limiter.metrics().requests_limited(), 3);
    }

    #[test]
    fn test_concurrent_evaluations_respect_ceiling() {
        use std::thread;

        let (limiter, _) = limiter(50, 1000);
        let limiter = Arc::new(limiter);
        let client = ClientKey::from("10.0.0.11");
        let mut handles = vec![];

        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            let client = client.clone();
            handles.push(thread::spawn(move || {
                (0..20)
                    .filter(|_| limiter.evaluate(&client).is_allow())
                    .count()
            }));
        }

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
