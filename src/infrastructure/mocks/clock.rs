//! Mock clock for testing.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::application::ports::Clock;

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling
/// deterministic testing of window expiry and lookback arithmetic. The
/// monotonic and wall-clock views advance together: `advance` moves both.
///
/// # Examples
///
/// ```
/// use trustgate::infrastructure::mocks::MockClock;
/// use trustgate::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
///
/// assert_eq!(clock.now(), start);
///
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(clock.now(), start + Duration::from_secs(61));
/// ```
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned to share across threads.
/// All clones share the same underlying time value, so advancing time in
/// one clone affects all clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<MockClockInner>>,
}

#[derive(Debug)]
struct MockClockInner {
    instant: Instant,
    wall: DateTime<Utc>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    ///
    /// The wall-clock view starts at the real current UTC time and advances
    /// in lockstep from there.
    pub fn new(start: Instant) -> Self {
        Self::with_wall_time(start, Utc::now())
    }

    /// Create a mock clock with explicit monotonic and wall-clock origins.
    pub fn with_wall_time(start: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClockInner {
                instant: start,
                wall,
            })),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut inner = self
            .inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        inner.instant += duration;
        inner.wall = inner.wall
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
    }

    /// Set the monotonic clock to a specific instant.
    ///
    /// The wall-clock view is left unchanged; prefer [`advance`](Self::advance)
    /// when both views matter.
    pub fn set(&self, instant: Instant) {
        let mut inner = self
            .inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        inner.instant = instant;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .instant
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.inner
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .wall
    }
}
