use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ReportId);
id_newtype!(GroupId);
id_newtype!(StationId);

/// Maximum length of a report remark, in characters.
pub const REMARK_MAX_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Red,
    Yellow,
    Green,
}

impl Status {
    /// Green means "no active issue"; red and yellow are both active,
    /// with no ordering between them.
    pub fn is_active(self) -> bool {
        !matches!(self, Status::Green)
    }
}

/// Identifies one board cell: a station within a display group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationKey {
    pub group: GroupId,
    pub station: StationId,
}

impl StationKey {
    pub fn new(group: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            group: GroupId::new(group),
            station: StationId::new(station),
        }
    }
}

/// The latest known status record for one station.
///
/// `reported_at` is the wall-clock time of the last status change and is
/// absent when the status is green.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    #[serde(flatten)]
    pub key: StationKey,
    pub status: Status,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Clears the active issue in place: status back to green, remark and
    /// timestamp dropped. The id and assignment survive so a later
    /// update-in-place still targets the same record.
    pub fn mark_resolved(&mut self) {
        self.status = Status::Green;
        self.remark.clear();
        self.reported_at = None;
    }
}
