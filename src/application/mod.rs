//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages runtime behavior:
//! - Vote service (upsert/remove/summarize votes)
//! - Report service (filing and review transitions)
//! - Flag scanner (review-worthiness listings)
//! - Rate limiter (per-client admission decisions)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod flagging;
pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod reporting;
#[cfg(feature = "async")]
pub mod sweeper;
pub mod voting;
