use serde::{Deserialize, Serialize};

use crate::{
    domain::{Report, ReportId, Status},
    error::ApiError,
};

/// Body of `POST /report`. The server assigns the report id and timestamp
/// and answers with the canonical [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReportRequest {
    pub group: String,
    pub station: String,
    pub status: Status,
    pub assigned_to: String,
    pub remark: String,
}

/// Events delivered over the push channel, outside the request/response
/// cycle. `NewReport` covers both creation and update; receivers cannot
/// distinguish the two and must not need to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BoardEvent {
    NewReport { report: Report },
    ResolveReport { report_id: ReportId },
    Error(ApiError),
}
