use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::Client;
use shared::{
    domain::{Report, ReportId, StationKey, Status, REMARK_MAX_LEN},
    protocol::{BoardEvent, SubmitReportRequest},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

pub mod catalog;
pub mod error;
pub mod projection;
pub mod reconcile;
pub mod store;

pub use catalog::StationCatalog;
pub use error::{ResolveError, SnapshotError, SubmitError};
pub use projection::DisplayCell;
pub use reconcile::{Applied, ReconciliationEngine};
pub use store::ReportStore;

/// Store-changed notifications broadcast to board viewers so they can
/// re-project without polling.
#[derive(Debug, Clone)]
pub enum BoardChange {
    SnapshotLoaded { report_count: usize },
    ReportUpserted(Report),
    ReportResolved(ReportId),
    PushError(String),
}

struct BoardClientState {
    server_url: Option<String>,
    engine: ReconciliationEngine,
    snapshot_loaded: bool,
    pending_resolve: Option<ReportId>,
    push_task: Option<JoinHandle<()>>,
}

/// Live board client: one startup snapshot, then a steady stream of push
/// events, plus this client's own writes acknowledged through the same
/// reconciliation path.
///
/// All store mutations funnel through `inner`, so each upsert/resolve is
/// atomic with respect to readers and events apply in arrival order.
pub struct BoardClient {
    http: Client,
    catalog: StationCatalog,
    inner: Mutex<BoardClientState>,
    changes: broadcast::Sender<BoardChange>,
}

impl BoardClient {
    pub fn new(catalog: StationCatalog) -> Arc<Self> {
        let (changes, _) = broadcast::channel(1024);
        Arc::new(Self {
            http: Client::new(),
            catalog,
            inner: Mutex::new(BoardClientState {
                server_url: None,
                engine: ReconciliationEngine::new(),
                snapshot_loaded: false,
                pending_resolve: None,
                push_task: None,
            }),
            changes,
        })
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// Two-phase startup: fetch the full snapshot, then start listening
    /// for push events. Presentation should not run before this returns;
    /// a snapshot failure means the board has no data, not all-green.
    pub async fn connect(self: &Arc<Self>, server_url: impl Into<String>) -> Result<()> {
        let server_url = server_url.into();
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(anyhow!("server_url must start with http:// or https://"));
        }

        {
            let mut guard = self.inner.lock().await;
            if guard.push_task.is_some() {
                return Err(anyhow!("board client is already connected"));
            }
            guard.server_url = Some(server_url.clone());
        }

        self.load_snapshot(&server_url).await?;
        self.spawn_push_events(&server_url).await?;
        Ok(())
    }

    /// True once the startup snapshot has been applied. Until then the
    /// store is empty because there is no data, not because the floor is
    /// green.
    pub async fn has_snapshot(&self) -> bool {
        self.inner.lock().await.snapshot_loaded
    }

    async fn load_snapshot(&self, server_url: &str) -> Result<()> {
        let response = self
            .http
            .get(format!("{server_url}/reports"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| SnapshotError::Network(err.to_string()))?;
        let reports: Vec<Report> = response
            .json()
            .await
            .map_err(|err| SnapshotError::Decode(err.to_string()))?;

        let report_count = reports.len();
        {
            let mut guard = self.inner.lock().await;
            guard.engine.load_snapshot(reports);
            guard.snapshot_loaded = true;
        }
        info!(report_count, "board snapshot loaded");
        let _ = self.changes.send(BoardChange::SnapshotLoaded { report_count });
        Ok(())
    }

    async fn spawn_push_events(self: &Arc<Self>, server_url: &str) -> Result<()> {
        let ws_url = if let Some(rest) = server_url.strip_prefix("https://") {
            format!("wss://{rest}/ws")
        } else if let Some(rest) = server_url.strip_prefix("http://") {
            format!("ws://{rest}/ws")
        } else {
            return Err(anyhow!("server_url must start with http:// or https://"));
        };
        let (ws_stream, _) = connect_async(&ws_url)
            .await
            .with_context(|| format!("failed to connect push channel: {ws_url}"))?;
        let (_, mut ws_reader) = ws_stream.split();

        let client = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<BoardEvent>(&text) {
                        Ok(event) => client.apply_remote(event).await,
                        Err(err) => {
                            let _ = client
                                .changes
                                .send(BoardChange::PushError(format!("invalid push event: {err}")));
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        error!(error = %err, "push channel receive failed");
                        let _ = client
                            .changes
                            .send(BoardChange::PushError(format!("push channel failed: {err}")));
                        break;
                    }
                }
            }
            warn!("push channel closed, board updates stopped");
        });

        let mut guard = self.inner.lock().await;
        guard.push_task = Some(task);
        Ok(())
    }

    /// Applies one inbound push event through the reconciliation engine
    /// and notifies viewers.
    async fn apply_remote(&self, event: BoardEvent) {
        let applied = {
            let mut guard = self.inner.lock().await;
            guard.engine.apply(event)
        };
        match applied {
            Applied::Upserted(report) => {
                let _ = self.changes.send(BoardChange::ReportUpserted(report));
            }
            Applied::Resolved { report_id, .. } => {
                let _ = self.changes.send(BoardChange::ReportResolved(report_id));
            }
            Applied::ServerError(err) => {
                let _ = self.changes.send(BoardChange::PushError(err.to_string()));
            }
        }
    }

    /// Submits a status report for one station.
    ///
    /// The server's canonical report (with its assigned id and timestamp)
    /// is applied locally exactly as an inbound push would be, so this
    /// client converges without waiting for its own push echo. On failure
    /// the request is abandoned and the store is untouched; no retry.
    pub async fn submit(
        &self,
        key: &StationKey,
        status: Status,
        remark: &str,
        assigned_to: &str,
    ) -> Result<Report> {
        let remark_len = remark.chars().count();
        if remark_len > REMARK_MAX_LEN {
            return Err(SubmitError::RemarkTooLong { len: remark_len }.into());
        }
        if !self.catalog.contains(key) {
            return Err(SubmitError::UnknownStation {
                group: key.group.0.clone(),
                station: key.station.0.clone(),
            }
            .into());
        }

        let server_url = self.session().await?;
        let report: Report = self
            .http
            .post(format!("{server_url}/report"))
            .json(&SubmitReportRequest {
                group: key.group.0.clone(),
                station: key.station.0.clone(),
                status,
                assigned_to: assigned_to.to_string(),
                remark: remark.to_string(),
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| SubmitError::Network(err.to_string()))?
            .json()
            .await
            .map_err(|err| SubmitError::Network(err.to_string()))?;

        info!(
            report_id = %report.id,
            group = %report.key.group,
            station = %report.key.station,
            status = ?report.status,
            "report submitted"
        );
        self.apply_remote(BoardEvent::NewReport {
            report: report.clone(),
        })
        .await;
        Ok(report)
    }

    /// Stages a report id for resolution, pending user confirmation. Does
    /// not touch the store or the network. A second request while one is
    /// pending overwrites the staged id.
    pub async fn request_resolve(&self, report_id: ReportId) {
        let mut guard = self.inner.lock().await;
        if let Some(previous) = guard.pending_resolve.replace(report_id.clone()) {
            info!(previous = %previous, report_id = %report_id, "pending resolve replaced");
        }
    }

    /// Sends the resolve request for the staged id. On success the staged
    /// id is cleared and the resolution is applied locally; the push echo
    /// converges to the same state. On failure the id stays pending so
    /// the user can confirm again.
    pub async fn confirm_resolve(&self) -> Result<ReportId> {
        let (server_url, report_id) = {
            let guard = self.inner.lock().await;
            let server_url = guard
                .server_url
                .clone()
                .ok_or_else(|| anyhow!("not connected: missing server_url"))?;
            let report_id = guard
                .pending_resolve
                .clone()
                .ok_or(ResolveError::NothingPending)?;
            (server_url, report_id)
        };

        self.http
            .post(format!("{server_url}/resolve/{report_id}"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| ResolveError::Network {
                report_id: report_id.clone(),
                message: err.to_string(),
            })?;

        {
            let mut guard = self.inner.lock().await;
            guard.pending_resolve = None;
        }
        info!(report_id = %report_id, "report resolved");
        self.apply_remote(BoardEvent::ResolveReport {
            report_id: report_id.clone(),
        })
        .await;
        Ok(report_id)
    }

    /// Drops the staged resolve id without any network effect.
    pub async fn cancel_resolve(&self) {
        let mut guard = self.inner.lock().await;
        guard.pending_resolve = None;
    }

    pub async fn pending_resolve(&self) -> Option<ReportId> {
        self.inner.lock().await.pending_resolve.clone()
    }

    /// Projects the current board against the catalog. Pure read; runs
    /// between atomic store mutations and never observes a partial entry.
    pub async fn project(&self, now: DateTime<Utc>) -> Vec<DisplayCell> {
        let guard = self.inner.lock().await;
        projection::project(&self.catalog, guard.engine.store(), now)
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<BoardChange> {
        self.changes.subscribe()
    }

    /// Stops listening for push events. In-flight requests are not
    /// cancellable and are left to complete on their own.
    pub async fn shutdown(&self) {
        let task = {
            let mut guard = self.inner.lock().await;
            guard.push_task.take()
        };
        if let Some(task) = task {
            task.abort();
        }
    }

    async fn session(&self) -> Result<String> {
        let guard = self.inner.lock().await;
        guard
            .server_url
            .clone()
            .ok_or_else(|| anyhow!("not connected: missing server_url"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
