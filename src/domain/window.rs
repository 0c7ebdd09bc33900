//! Sliding time window over request timestamps.
//!
//! A window keeps the timestamps of events that happened within a fixed
//! duration of "now". Entries outside the window are purged lazily at
//! evaluation time rather than by a background sweep, so the cost is
//! amortized per client and bounded by the number of stale entries.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Length of the per-minute window.
pub const MINUTE_WINDOW: Duration = Duration::from_secs(60);

/// Length of the per-hour window.
pub const HOUR_WINDOW: Duration = Duration::from_secs(3600);

/// Which window rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// The per-minute ceiling.
    Minute,
    /// The per-hour ceiling.
    Hour,
}

impl LimitScope {
    /// Human-readable rejection reason.
    pub fn reason(&self) -> &'static str {
        match self {
            LimitScope::Minute => "minute limit exceeded",
            LimitScope::Hour => "hour limit exceeded",
        }
    }
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A time-bounded FIFO of event timestamps.
///
/// # Example
/// ```
/// use trustgate::domain::window::SlidingWindow;
/// use std::time::{Duration, Instant};
///
/// let mut window = SlidingWindow::new(Duration::from_secs(60));
/// let now = Instant::now();
///
/// window.record(now);
/// window.record(now);
/// assert_eq!(window.occupancy(now), 2);
///
/// // Entries age out once the window has passed over them.
/// let later = now + Duration::from_secs(61);
/// assert_eq!(window.occupancy(later), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    length: Duration,
    timestamps: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Create an empty window of the given length.
    pub fn new(length: Duration) -> Self {
        Self {
            length,
            timestamps: VecDeque::new(),
        }
    }

    /// The configured window length.
    pub fn length(&self) -> Duration {
        self.length
    }

    /// Drop all timestamps older than the window floor.
    pub fn purge(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > self.length {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Append an event timestamp.
    ///
    /// Callers are expected to [`purge`](Self::purge) first; the window does
    /// not re-check older entries on append.
    pub fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    /// Number of entries currently stored, stale ones included.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the window holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Purge and return the surviving count in one step.
    pub fn count(&mut self, now: Instant) -> usize {
        self.purge(now);
        self.timestamps.len()
    }

    /// Count surviving entries without mutating the window.
    ///
    /// Used by read-only quota introspection, which must not consume or
    /// restructure state.
    pub fn occupancy(&self, now: Instant) -> usize {
        self.timestamps
            .iter()
            .filter(|&&ts| now.saturating_duration_since(ts) <= self.length)
            .count()
    }

    /// When the window next frees a slot: oldest surviving entry plus the
    /// window length, or `now` when nothing survives.
    pub fn resets_at(&self, now: Instant) -> Instant {
        self.timestamps
            .iter()
            .find(|&&ts| now.saturating_duration_since(ts) <= self.length)
            .map_or(now, |&oldest| oldest + self.length)
    }
}

/// Per-client rate window state: the minute and hour sequences plus the
/// last-seen instant used by idle eviction.
#[derive(Debug, Clone)]
pub struct ClientWindows {
    /// The 60-second window.
    pub minute: SlidingWindow,
    /// The 3600-second window.
    pub hour: SlidingWindow,
    /// Last time this client was evaluated. Drives idle eviction only;
    /// windowing semantics never read it.
    pub last_seen: Instant,
}

impl ClientWindows {
    /// Fresh state for a client first seen at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            minute: SlidingWindow::new(MINUTE_WINDOW),
            hour: SlidingWindow::new(HOUR_WINDOW),
            last_seen: now,
        }
    }

    /// Mark the client as seen.
    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    /// Whether the client has been idle for at least `max_idle`.
    pub fn idle_since(&self, now: Instant, max_idle: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= max_idle
    }
}
