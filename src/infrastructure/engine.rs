//! Assembled trust engine and its builder.
//!
//! [`TrustEngine`] bundles the vote service, report service, flag scanner
//! and rate limiter behind one handle for the routing layer. The builder
//! assembles the default in-memory adapters and validates configuration;
//! [`TrustEngine::with_parts`] wires custom directory and ledger adapters
//! instead.

use std::net::IpAddr;
use std::sync::Arc;

use crate::application::flagging::FlagScanner;
use crate::application::limiter::{Decision, QuotaStatus, RateLimitConfig, RateLimiter};
use crate::application::metrics::{Metrics, MetricsSnapshot};
use crate::application::ports::{Clock, EntityDirectory, ReportStore, VoteStore};
use crate::application::reporting::ReportService;
use crate::application::voting::VoteService;
use crate::domain::client::ClientKey;
use crate::domain::entity::{EntityKind, EntityRef, UserId};
use crate::domain::error::Result;
use crate::domain::flag::{FlagCriteria, FlaggedSummary};
use crate::domain::report::{ReportId, ReportReason, ReportRecord, ReportStatus};
use crate::domain::vote::{VoteDirection, VoteRecord, VoteSummary};
use crate::infrastructure::client::ClientResolver;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::counters::CounterStore;
use crate::infrastructure::eviction::IdleLruEviction;
use crate::infrastructure::memory::{MemoryDirectory, MemoryReportStore, MemoryVoteStore};

#[cfg(feature = "async")]
use crate::application::sweeper::{IdleSweeper, SweeperConfig};

/// Error returned when building a [`TrustEngine`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `requests_per_minute` must be greater than zero
    ZeroMinuteCeiling,
    /// `requests_per_hour` must be greater than zero
    ZeroHourCeiling,
    /// The tracked-client bound must be greater than zero
    ZeroMaxClients,
    /// The idle sweep interval must be greater than zero
    #[cfg(feature = "async")]
    ZeroSweepInterval,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ZeroMinuteCeiling => {
                write!(f, "requests_per_minute must be greater than 0")
            }
            BuildError::ZeroHourCeiling => {
                write!(f, "requests_per_hour must be greater than 0")
            }
            BuildError::ZeroMaxClients => {
                write!(f, "max_clients must be greater than 0")
            }
            #[cfg(feature = "async")]
            BuildError::ZeroSweepInterval => {
                write!(f, "sweep interval must be greater than 0")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder for constructing a [`TrustEngine`] over the in-memory adapters.
pub struct TrustEngineBuilder {
    clock: Option<Arc<dyn Clock>>,
    rate_limits: RateLimitConfig,
    max_clients: Option<usize>,
    trusted_proxies: Option<Vec<IpAddr>>,
    reject_self_votes: bool,
    #[cfg(feature = "async")]
    sweep: Option<SweeperConfig>,
}

impl TrustEngineBuilder {
    fn new() -> Self {
        Self {
            clock: None,
            rate_limits: RateLimitConfig::default(),
            max_clients: None,
            trusted_proxies: None,
            reject_self_votes: false,
            #[cfg(feature = "async")]
            sweep: None,
        }
    }

    /// Set the per-minute and per-hour request ceilings.
    ///
    /// Defaults: 60 per minute, 1000 per hour. Validated in
    /// [`build`](Self::build).
    pub fn with_rate_limits(mut self, config: RateLimitConfig) -> Self {
        self.rate_limits = config;
        self
    }

    /// Bound the number of tracked rate-limiter clients.
    ///
    /// When the bound is reached, the client idle the longest is evicted to
    /// make room. Without a bound the counter store grows for the process
    /// lifetime.
    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = Some(max_clients);
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Honor forwarded-for headers only from these proxy addresses.
    ///
    /// Without this, the header is trusted unconditionally - the original
    /// deployment behavior. Listing proxies means a direct client claiming a
    /// forwarded-for is counted by its own transport address instead.
    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = Some(proxies.into_iter().collect());
        self
    }

    /// Reject votes from an entity's owner with `Conflict(SelfVote)`.
    ///
    /// Default: owners may vote on their own entities.
    pub fn with_reject_self_votes(mut self, reject: bool) -> Self {
        self.reject_self_votes = reject;
        self
    }

    /// Configure the background idle-client sweep.
    ///
    /// The sweep itself is started with
    /// [`TrustEngine::start_idle_sweeper`], which requires a running tokio
    /// runtime. The interval is validated in [`build`](Self::build).
    #[cfg(feature = "async")]
    pub fn with_idle_sweep(mut self, config: SweeperConfig) -> Self {
        self.sweep = Some(config);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> std::result::Result<TrustEngine, BuildError> {
        if self.rate_limits.requests_per_minute == 0 {
            return Err(BuildError::ZeroMinuteCeiling);
        }
        if self.rate_limits.requests_per_hour == 0 {
            return Err(BuildError::ZeroHourCeiling);
        }
        if self.max_clients == Some(0) {
            return Err(BuildError::ZeroMaxClients);
        }
        #[cfg(feature = "async")]
        if let Some(sweep) = &self.sweep {
            if sweep.interval.is_zero() {
                return Err(BuildError::ZeroSweepInterval);
            }
        }

        let metrics = Metrics::new();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let mut counters = CounterStore::new().with_metrics(metrics.clone());
        if let Some(max_clients) = self.max_clients {
            counters = counters.with_eviction_policy(Arc::new(IdleLruEviction::new(max_clients)));
        }

        let resolver = match self.trusted_proxies {
            Some(proxies) => ClientResolver::with_trusted_proxies(proxies),
            None => ClientResolver::new(),
        };

        let engine = TrustEngine::assemble(
            Arc::new(MemoryDirectory::new()),
            Arc::new(MemoryVoteStore::new()),
            Arc::new(MemoryReportStore::new()),
            Arc::new(counters),
            clock,
            self.rate_limits,
            resolver,
            metrics,
            self.reject_self_votes,
        );
        #[cfg(feature = "async")]
        let engine = {
            let mut engine = engine;
            engine.sweep = self.sweep;
            engine
        };
        Ok(engine)
    }
}

/// The assembled trust & abuse-control core.
///
/// Generic over the directory and ledger adapters; the builder wires the
/// in-memory defaults, and `with_parts` accepts anything implementing the
/// ports.
#[derive(Clone)]
pub struct TrustEngine<
    D = Arc<MemoryDirectory>,
    V = Arc<MemoryVoteStore>,
    R = Arc<MemoryReportStore>,
> where
    D: EntityDirectory + Clone,
    V: VoteStore + Clone,
    R: ReportStore + Clone,
{
    directory: D,
    voting: VoteService<D, V>,
    reporting: ReportService<D, R>,
    flagging: FlagScanner<V, R>,
    limiter: RateLimiter<Arc<CounterStore>>,
    resolver: ClientResolver,
    metrics: Metrics,
    #[cfg(feature = "async")]
    sweep: Option<SweeperConfig>,
    clock: Arc<dyn Clock>,
}

impl TrustEngine {
    /// Start building an engine over the in-memory adapters.
    pub fn builder() -> TrustEngineBuilder {
        TrustEngineBuilder::new()
    }
}

impl<D, V, R> TrustEngine<D, V, R>
where
    D: EntityDirectory + Clone,
    V: VoteStore + Clone,
    R: ReportStore + Clone,
{
    /// Assemble an engine from custom adapters.
    ///
    /// The counter store, resolver and metrics are still owned by the
    /// engine; only the directory and the two ledgers are injected.
    pub fn with_parts(
        directory: D,
        votes: V,
        reports: R,
        clock: Arc<dyn Clock>,
        rate_limits: RateLimitConfig,
    ) -> Self {
        Self::assemble(
            directory,
            votes,
            reports,
            Arc::new(CounterStore::new()),
            clock,
            rate_limits,
            ClientResolver::new(),
            Metrics::new(),
            false,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        directory: D,
        votes: V,
        reports: R,
        counters: Arc<CounterStore>,
        clock: Arc<dyn Clock>,
        rate_limits: RateLimitConfig,
        resolver: ClientResolver,
        metrics: Metrics,
        reject_self_votes: bool,
    ) -> Self {
        Self {
            directory: directory.clone(),
            voting: VoteService::new(
                directory.clone(),
                votes.clone(),
                clock.clone(),
                metrics.clone(),
                reject_self_votes,
            ),
            reporting: ReportService::new(
                directory,
                reports.clone(),
                clock.clone(),
                metrics.clone(),
            ),
            flagging: FlagScanner::new(votes, reports, clock.clone()),
            limiter: RateLimiter::new(counters, clock.clone(), rate_limits, metrics.clone()),
            resolver,
            metrics,
            #[cfg(feature = "async")]
            sweep: None,
            clock,
        }
    }

    /// Record or overwrite a user's vote. See
    /// [`VoteService::upsert_vote`].
    pub fn upsert_vote(
        &self,
        entity: EntityRef,
        user_id: UserId,
        direction: VoteDirection,
    ) -> Result<VoteRecord> {
        self.voting.upsert_vote(entity, user_id, direction)
    }

    /// Remove a user's vote. Returns whether a record existed.
    pub fn remove_vote(&self, entity: EntityRef, user_id: UserId) -> bool {
        self.voting.remove_vote(entity, user_id)
    }

    /// The user's current vote, if any.
    pub fn user_vote(&self, entity: EntityRef, user_id: UserId) -> Option<VoteRecord> {
        self.voting.user_vote(entity, user_id)
    }

    /// Vote breakdown for an entity.
    pub fn vote_summary(&self, entity: EntityRef) -> Result<VoteSummary> {
        self.voting.vote_summary(entity)
    }

    /// File a report. See [`ReportService::create_report`].
    pub fn create_report(
        &self,
        entity: EntityRef,
        reporter_id: UserId,
        reason: ReportReason,
        description: Option<String>,
    ) -> Result<ReportRecord> {
        self.reporting
            .create_report(entity, reporter_id, reason, description)
    }

    /// Move a report to a new status. See
    /// [`ReportService::update_report_status`].
    pub fn update_report_status(
        &self,
        report_id: ReportId,
        new_status: ReportStatus,
        admin_notes: Option<String>,
        reviewer_id: UserId,
    ) -> Result<ReportRecord> {
        self.reporting
            .update_report_status(report_id, new_status, admin_notes, reviewer_id)
    }

    /// Look up a report by id.
    pub fn report(&self, report_id: ReportId) -> Option<ReportRecord> {
        self.reporting.report(report_id)
    }

    /// Every report against an entity, oldest first.
    pub fn reports_for_entity(&self, entity: EntityRef) -> Vec<ReportRecord> {
        self.reporting.reports_for_entity(entity)
    }

    /// The pending moderation queue for a kind.
    pub fn pending_reports(&self, kind: EntityKind) -> Vec<ReportRecord> {
        self.reporting.pending_reports(kind)
    }

    /// Entities of a kind meeting the review thresholds.
    pub fn flagged_entities(
        &self,
        kind: EntityKind,
        criteria: FlagCriteria,
    ) -> Vec<FlaggedSummary> {
        self.flagging.flagged_entities(kind, criteria)
    }

    /// Evaluate one request for a resolved client key.
    pub fn evaluate(&self, client: &ClientKey) -> Decision {
        self.limiter.evaluate(client)
    }

    /// Resolve the client from request transport data, then evaluate.
    pub fn evaluate_request(
        &self,
        forwarded_for: Option<&str>,
        peer: IpAddr,
    ) -> (ClientKey, Decision) {
        let client = self.resolver.resolve(forwarded_for, peer);
        let decision = self.limiter.evaluate(&client);
        (client, decision)
    }

    /// Remaining quota for a client. Pure read.
    pub fn remaining_quota(&self, client: &ClientKey) -> QuotaStatus {
        self.limiter.remaining_quota(client)
    }

    /// Cascade hook: drop every vote on a destroyed entity.
    ///
    /// Reports are intentionally kept - they are the audit trail.
    pub fn entity_deleted(&self, entity: EntityRef) -> usize {
        self.voting.remove_entity_votes(entity)
    }

    /// Start the configured background idle-client sweep.
    ///
    /// Returns `None` when no sweep was configured. Must be called from
    /// within a tokio runtime.
    #[cfg(feature = "async")]
    pub fn start_idle_sweeper(&self) -> Option<tokio::task::JoinHandle<()>> {
        let config = self.sweep.clone()?;
        let sweeper = IdleSweeper::new(
            self.limiter.store().clone(),
            self.clock.clone(),
            config,
            self.metrics.clone(),
        );
        Some(sweeper.start())
    }

    /// A point-in-time snapshot of engine metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The vote service.
    pub fn voting(&self) -> &VoteService<D, V> {
        &self.voting
    }

    /// The report service.
    pub fn reporting(&self) -> &ReportService<D, R> {
        &self.reporting
    }

    /// The flag scanner.
    pub fn flagging(&self) -> &FlagScanner<V, R> {
        &self.flagging
    }

    /// The rate limiter.
    pub fn limiter(&self) -> &RateLimiter<Arc<CounterStore>> {
        &self.limiter
    }

    /// The client resolver.
    pub fn resolver(&self) -> &ClientResolver {
        &self.resolver
    }

    /// The entity directory adapter.
    ///
    /// For the builder-built engine this is the in-memory directory, which
    /// tests and demos seed with entities before voting on them.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// The engine's clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
