//! Report ledger orchestration.
//!
//! Filing runs its guards in a fixed order - entity existence, self-report,
//! duplicate pending - and writes nothing until all pass. Review transitions
//! are unrestricted across the flat status set; the only side effect is
//! stamping `reviewed_by`/`reviewed_at` whenever a report leaves `Pending`.

use std::sync::Arc;

use tracing::debug;

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, EntityDirectory, ReportStore};
use crate::domain::entity::{EntityKind, EntityRef, UserId};
use crate::domain::error::{ConflictKind, Error, Result};
use crate::domain::report::{NewReport, ReportId, ReportReason, ReportRecord, ReportStatus};

/// Coordinates report filing and review over the report ledger.
#[derive(Clone)]
pub struct ReportService<D, R> {
    directory: D,
    store: R,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<D, R> ReportService<D, R>
where
    D: EntityDirectory,
    R: ReportStore,
{
    /// Create a new report service.
    pub fn new(directory: D, store: R, clock: Arc<dyn Clock>, metrics: Metrics) -> Self {
        Self {
            directory,
            store,
            clock,
            metrics,
        }
    }

    /// File a report against an entity.
    ///
    /// # Errors
    /// - `NotFound` if the entity does not exist
    /// - `Conflict(SelfReport)` if the reporter owns the entity
    /// - `Conflict(DuplicatePending)` if the reporter already holds a
    ///   pending report against this entity
    ///
    /// All guards run before any row is written. Historical resolved or
    /// dismissed reports from the same reporter do not block a new filing.
    pub fn create_report(
        &self,
        entity: EntityRef,
        reporter_id: UserId,
        reason: ReportReason,
        description: Option<String>,
    ) -> Result<ReportRecord> {
        if !self.directory.exists(entity) {
            return Err(Error::NotFound);
        }

        if self.directory.owner_of(entity) == Some(reporter_id) {
            return Err(Error::Conflict(ConflictKind::SelfReport));
        }

        if self.store.has_pending_from(entity, reporter_id) {
            return Err(Error::Conflict(ConflictKind::DuplicatePending));
        }

        let record = self.store.insert(
            NewReport {
                entity,
                reporter_id,
                reason,
                description,
            },
            self.clock.now_utc(),
        );
        self.metrics.record_report();
        debug!(entity = %entity, reporter_id, reason = %reason, report_id = record.id, "report filed");

        Ok(record)
    }

    /// Move a report to a new status.
    ///
    /// Any status is reachable from any other - the transition set is flat
    /// by design, not a pipeline. Whenever the transition leaves `Pending`,
    /// `reviewed_by` and `reviewed_at` are stamped with the acting reviewer;
    /// `admin_notes`, when given, replaces the previous notes.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown report id.
    pub fn update_report_status(
        &self,
        report_id: ReportId,
        new_status: ReportStatus,
        admin_notes: Option<String>,
        reviewer_id: UserId,
    ) -> Result<ReportRecord> {
        let now = self.clock.now_utc();

        let updated = self.store.update(report_id, |report| {
            let was_pending = report.is_pending();

            report.status = new_status;
            if let Some(notes) = admin_notes {
                report.admin_notes = Some(notes);
            }
            if was_pending && new_status != ReportStatus::Pending {
                report.reviewed_by = Some(reviewer_id);
                report.reviewed_at = Some(now);
            }
            report.updated_at = now;
        });

        let record = updated.ok_or(Error::NotFound)?;
        debug!(report_id, status = %record.status, reviewer_id, "report status updated");
        Ok(record)
    }

    /// Look up a report by id.
    pub fn report(&self, report_id: ReportId) -> Option<ReportRecord> {
        self.store.find(report_id)
    }

    /// Every report filed against an entity, oldest first.
    pub fn reports_for_entity(&self, entity: EntityRef) -> Vec<ReportRecord> {
        self.store.for_entity(entity)
    }

    /// The pending moderation queue for a kind, oldest first.
    pub fn pending_reports(&self, kind: EntityKind) -> Vec<ReportRecord> {
        self.store.pending_for_kind(kind)
    }

    /// Get a reference to the underlying report store.
    pub fn store(&self) -> &R {
        &self.store
    }
}
