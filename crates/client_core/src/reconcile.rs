use shared::{
    domain::{Report, ReportId},
    error::ApiError,
    protocol::BoardEvent,
};
use tracing::{debug, warn};

use crate::store::ReportStore;

/// What a single applied event did to the store, for change notification.
#[derive(Debug, Clone)]
pub enum Applied {
    Upserted(Report),
    Resolved { report_id: ReportId, found: bool },
    ServerError(ApiError),
}

/// The single authority translating external events into store calls.
///
/// All three event sources — the startup snapshot, push events from other
/// clients, and acknowledgments of this client's own writes — funnel
/// through here, so precedence is uniformly last-arrival-wins. There is no
/// logical clock on the wire; two conflicting near-simultaneous updates
/// for one station settle to whichever reaches this client last.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    store: ReportStore,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Replaces the store contents with the startup snapshot.
    pub fn load_snapshot(&mut self, reports: Vec<Report>) {
        let count = reports.len();
        self.store.load_snapshot(reports);
        debug!(reports = count, entries = self.store.len(), "snapshot loaded");
    }

    /// Applies one push event (or an acknowledgment replayed as one).
    /// Applying the same event twice yields the same store state.
    pub fn apply(&mut self, event: BoardEvent) -> Applied {
        match event {
            BoardEvent::NewReport { report } => {
                debug!(
                    report_id = %report.id,
                    group = %report.key.group,
                    station = %report.key.station,
                    status = ?report.status,
                    "applying report upsert"
                );
                self.store.upsert(report.clone());
                Applied::Upserted(report)
            }
            BoardEvent::ResolveReport { report_id } => {
                let found = self.store.resolve(&report_id);
                if !found {
                    // Unknown or already-resolved id: already satisfied.
                    debug!(report_id = %report_id, "resolve for unknown id, no-op");
                }
                Applied::Resolved { report_id, found }
            }
            BoardEvent::Error(err) => {
                warn!(code = ?err.code, message = %err.message, "server pushed error event");
                Applied::ServerError(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
