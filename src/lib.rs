//! # trustgate
//!
//! Voting, reporting and rate-limiting core for community backends.
//!
//! This crate implements the trust & abuse-control subsystem of an
//! entity-CRUD web application: one generic voting/reporting engine applied
//! uniformly to three entity kinds (cars, build lists, global parts), an
//! automated flagged-for-review heuristic over a rolling window, and a
//! per-client sliding-window rate limiter with independent per-minute and
//! per-hour ceilings. Routing, persistence and authentication stay outside:
//! the engine consumes an entity directory and ledger ports, and hands
//! decisions and summaries back to whatever serves the requests.
//!
//! ## Quick Start
//!
//! ```rust
//! use trustgate::{EntityRef, ReportReason, TrustEngine, VoteDirection};
//!
//! let engine = TrustEngine::builder().build().unwrap();
//!
//! // Seed the in-memory directory (a database adapter answers these
//! // lookups in production).
//! let car = EntityRef::car(17);
//! engine.directory().add(car, 100);
//!
//! // Votes upsert: one record per user per entity, last direction wins.
//! engine.upsert_vote(car, 1, VoteDirection::Upvote).unwrap();
//! engine.upsert_vote(car, 2, VoteDirection::Downvote).unwrap();
//! let summary = engine.vote_summary(car).unwrap();
//! assert_eq!(summary.total, 2);
//!
//! // Reports hold one pending slot per reporter per entity.
//! engine
//!     .create_report(car, 2, ReportReason::Inaccurate, None)
//!     .unwrap();
//! ```
//!
//! ## Rate limiting
//!
//! Each client key carries a 60-second and a 3600-second window. An
//! evaluation purges stale timestamps, rejects on the first exceeded
//! ceiling without recording the attempt, and otherwise records the request
//! in both windows:
//!
//! ```rust
//! use trustgate::{ClientKey, RateLimitConfig, TrustEngine};
//!
//! let engine = TrustEngine::builder()
//!     .with_rate_limits(RateLimitConfig {
//!         requests_per_minute: 2,
//!         requests_per_hour: 1000,
//!     })
//!     .build()
//!     .unwrap();
//!
//! let client = ClientKey::from("203.0.113.7");
//! assert!(engine.evaluate(&client).is_allow());
//! assert!(engine.evaluate(&client).is_allow());
//! assert_eq!(
//!     engine.evaluate(&client).reason(),
//!     Some("minute limit exceeded")
//! );
//!
//! // Introspection is a pure read; it never consumes quota.
//! let quota = engine.remaining_quota(&client);
//! assert_eq!(quota.minute_remaining, 0);
//! ```
//!
//! Client keys resolve from the first forwarded-for entry when present,
//! else the transport peer address. The header is trusted unconditionally
//! by default; `with_trusted_proxies` restricts it to known proxy peers.
//!
//! ## Flagged entities
//!
//! `flagged_entities` walks the ledgers and lists entities whose all-time
//! downvote count crosses the threshold, or which were reported within the
//! lookback window - ordered by downvote count descending, ties broken by
//! entity id ascending:
//!
//! ```rust
//! use trustgate::{EntityKind, FlagCriteria, TrustEngine};
//!
//! let engine = TrustEngine::builder().build().unwrap();
//! let criteria = FlagCriteria::new(30, 5).unwrap();
//! let flagged = engine.flagged_entities(EntityKind::Car, criteria);
//! assert!(flagged.is_empty());
//! ```
//!
//! ## Memory management
//!
//! The counter store tracks one entry per client key and, unbounded, lives
//! for the process lifetime. Two independent bounds are available:
//!
//! - `with_max_clients(n)` - evict the longest-idle client when the bound
//!   is reached; active clients keep their window state.
//! - the `async` feature's idle sweeper - a background task dropping
//!   clients idle past a configured duration.
//!
//! ## Custom adapters
//!
//! The builder assembles in-memory adapters. Production deployments inject
//! their own implementations of the
//! [`EntityDirectory`](application::ports::EntityDirectory),
//! [`VoteStore`](application::ports::VoteStore) and
//! [`ReportStore`](application::ports::ReportStore) ports via
//! [`TrustEngine::with_parts`]. The vote store must key records on the
//! (entity, user) pair - a unique constraint on the triple in a database
//! adapter - so concurrent re-votes resolve to a single row.
//!
//! ## Feature flags
//!
//! - `async` - background idle-client sweeper (pulls in tokio)
//! - `serde` - Serialize/Deserialize derives on domain types

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    client::ClientKey,
    entity::{EntityId, EntityKind, EntityRef, UserId},
    error::{ConflictKind, Error, Result},
    flag::{FlagCriteria, FlaggedSummary},
    report::{NewReport, ReportId, ReportReason, ReportRecord, ReportStatus},
    vote::{VoteDirection, VoteRecord, VoteSummary, VoteTally},
    window::{ClientWindows, LimitScope, SlidingWindow},
};

pub use application::{
    flagging::FlagScanner,
    limiter::{Decision, QuotaStatus, RateLimitConfig, RateLimiter},
    metrics::{Metrics, MetricsSnapshot},
    ports::{
        Clock, EntityDirectory, EvictionCandidate, EvictionPolicy, ReportStore, VoteStore,
        WindowStore,
    },
    reporting::ReportService,
    voting::VoteService,
};

#[cfg(feature = "async")]
pub use application::sweeper::{IdleSweeper, SweeperConfig};

pub use infrastructure::{
    client::ClientResolver,
    clock::SystemClock,
    counters::CounterStore,
    engine::{BuildError, TrustEngine, TrustEngineBuilder},
    eviction::IdleLruEviction,
    memory::{MemoryDirectory, MemoryReportStore, MemoryVoteStore},
};
