use shared::domain::{Report, ReportId, StationKey};

/// Latest known report per station.
///
/// Backed by a plain list; the uniqueness invariant is what matters, not
/// the representation. After any call, no two entries share a `StationKey`
/// and no two entries share a `ReportId`. A station with no entry is
/// implicitly green.
#[derive(Debug, Clone, Default)]
pub struct ReportStore {
    entries: Vec<Report>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the report for its station.
    ///
    /// An existing entry with the same id is replaced in place. Failing
    /// that, an existing entry with the same key is replaced, which absorbs
    /// id churn for the same logical station (e.g. a late snapshot entry
    /// carrying a different id). Otherwise the report is appended.
    pub fn upsert(&mut self, report: Report) {
        let slot = self
            .entries
            .iter()
            .position(|r| r.id == report.id || r.key == report.key);
        self.entries
            .retain(|r| r.id != report.id && r.key != report.key);
        match slot {
            // Entries before the first match are all non-matching, so the
            // index is still valid after the retain.
            Some(pos) => self.entries.insert(pos, report),
            None => self.entries.push(report),
        }
    }

    /// Sets the matching entry back to green, clearing remark and
    /// timestamp but keeping the record and its id. An unknown id is
    /// treated as already satisfied and returns `false`.
    pub fn resolve(&mut self, id: &ReportId) -> bool {
        match self.entries.iter_mut().find(|r| &r.id == id) {
            Some(report) => {
                report.mark_resolved();
                true
            }
            None => false,
        }
    }

    /// Replaces the entire contents with the snapshot, applying `upsert`
    /// semantics sequentially so duplicate ids or keys in the snapshot
    /// collapse to the last occurrence.
    pub fn load_snapshot(&mut self, reports: Vec<Report>) {
        self.entries.clear();
        for report in reports {
            self.upsert(report);
        }
    }

    /// Current entries. Order is not significant; presentation re-derives
    /// order from the catalog.
    pub fn all(&self) -> &[Report] {
        &self.entries
    }

    pub fn get(&self, key: &StationKey) -> Option<&Report> {
        self.entries.iter().find(|r| &r.key == key)
    }

    pub fn get_by_id(&self, id: &ReportId) -> Option<&Report> {
        self.entries.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
