use shared::domain::{ReportId, REMARK_MAX_LEN};
use thiserror::Error;

/// Failure to populate the board at startup. Fatal to initial board
/// population: callers must surface "no data" rather than render an
/// all-green board.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to fetch board snapshot: {0}")]
    Network(String),
    #[error("board snapshot was not valid JSON: {0}")]
    Decode(String),
}

/// Failure to submit a status report. The local store is left unchanged;
/// the user may retry manually.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("remark is {len} characters, limit is {REMARK_MAX_LEN}")]
    RemarkTooLong { len: usize },
    #[error("station ({group}, {station}) is not on this board")]
    UnknownStation { group: String, station: String },
    #[error("failed to submit report: {0}")]
    Network(String),
}

/// Failure in the resolve confirmation flow. A network failure keeps the
/// staged id pending so the user can confirm again.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no resolve is pending confirmation")]
    NothingPending,
    #[error("failed to resolve report {report_id}: {message}")]
    Network { report_id: ReportId, message: String },
}
