use chrono::{DateTime, Duration, Utc};
use shared::domain::{StationKey, Status};

use crate::{catalog::StationCatalog, store::ReportStore};

/// Display state for one board cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCell {
    pub key: StationKey,
    pub status: Status,
    /// Shown only for an active (non-green) status with a non-empty remark.
    pub remark: Option<String>,
    /// Elapsed-time label, shown only for an active status with a
    /// known report time.
    pub age: Option<String>,
}

/// Derives the full board from catalog and store: exactly one cell per
/// catalog entry, in catalog order. A station absent from the store is
/// green with no remark and no age. Pure; store contents and order never
/// affect cell order.
pub fn project(catalog: &StationCatalog, store: &ReportStore, now: DateTime<Utc>) -> Vec<DisplayCell> {
    catalog
        .entries()
        .iter()
        .map(|key| match store.get(key) {
            None => DisplayCell {
                key: key.clone(),
                status: Status::Green,
                remark: None,
                age: None,
            },
            Some(report) => {
                let active = report.status.is_active();
                DisplayCell {
                    key: key.clone(),
                    status: report.status,
                    remark: (active && !report.remark.is_empty()).then(|| report.remark.clone()),
                    age: if active {
                        report
                            .reported_at
                            .map(|at| elapsed_label(now.signed_duration_since(at)))
                    } else {
                        None
                    },
                }
            }
        })
        .collect()
}

/// Single coarsest non-zero unit, integer floor: seconds under a minute,
/// minutes under an hour, hours under a day, days beyond.
pub fn elapsed_label(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}hr ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
