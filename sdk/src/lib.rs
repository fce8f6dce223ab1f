//! Entry point for embedding the connectome dashboard: loads the three input
//! documents concurrently and exposes the session's views and controls.

use connectome_core::config::AppConfig;
use connectome_core::diagnostics::{Dataset, DiagnosticSink, NoopDiagnosticSink};
use connectome_core::model::MetadataRecord;
use connectome_core::SegmentId;
use ingestion::{load, DatasetSource, FileSource, LoadError, LoadedDataset};
use session::{
    CellClick, ChannelEventQueue, EventQueue, MatrixView, MetadataPanel, Session, SessionEvent,
    SessionSnapshot, SessionWorker, ViewStatus,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use session;
pub use viewer;

const DATASETS: [Dataset; 3] = [Dataset::Edges, Dataset::Metadata, Dataset::ViewerState];

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("session queue error: {0}")]
    Queue(#[from] anyhow::Error),
    #[error("session worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Starts one Tokio task per dataset. Each reports its result on the
/// returned channel as soon as it finishes.
fn spawn_loads(
    source: Arc<dyn DatasetSource>,
    key_field: String,
) -> mpsc::Receiver<Result<LoadedDataset, LoadError>> {
    let (tx, rx) = mpsc::channel(DATASETS.len());
    for dataset in DATASETS {
        let source = source.clone();
        let key_field = key_field.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = load(source.as_ref(), dataset, &key_field).await;
            if tx.send(result).await.is_err() {
                error!("Session dropped before {} finished loading", dataset);
            }
        });
    }
    rx
}

/// A fully loaded dashboard driven synchronously.
pub struct Dashboard {
    session: Session,
}

impl Dashboard {
    /// Loads all three datasets and applies them in completion order. A
    /// failed dataset only affects the views that need it.
    pub async fn load(source: Arc<dyn DatasetSource>, config: &AppConfig) -> Self {
        Self::load_with_diagnostics(source, config, Arc::new(NoopDiagnosticSink)).await
    }

    pub async fn load_with_diagnostics(
        source: Arc<dyn DatasetSource>,
        config: &AppConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let mut session = Session::new(config).with_diagnostics(diagnostics);
        let mut results = spawn_loads(source, config.dataset.key_field.clone());
        while let Some(result) = results.recv().await {
            session.apply(SessionEvent::Loaded(result));
        }
        info!("Dashboard loaded: {}", session.selection_display());
        Self { session }
    }

    /// Loads from `dir` using the file names in `config.sources`.
    pub async fn open_dir(dir: impl AsRef<Path>, config: &AppConfig) -> Self {
        let source = FileSource::new(dir.as_ref(), config.sources.clone());
        Self::load(Arc::new(source), config).await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn click(&mut self, row: &str, col: &str) -> SegmentId {
        self.session.click(&CellClick::new(row, col))
    }

    /// Clicks the cell at matrix indices. `None` when edges are not loaded
    /// or the indices are out of range.
    pub fn click_cell(&mut self, row: usize, col: usize) -> Option<SegmentId> {
        let click = CellClick::at_cell(self.session.matrix()?, row, col)?;
        Some(self.session.click(&click))
    }

    /// Clicks the cell named by a chart click payload. `None` when the
    /// payload carries no point.
    pub fn click_plot_event(&mut self, event: &Value) -> Option<SegmentId> {
        let click = CellClick::from_plot_event(event)?;
        Some(self.session.click(&click))
    }

    pub fn add(&mut self, id: &str) {
        self.session.add(SegmentId::new(id));
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn selection_display(&self) -> String {
        self.session.selection_display()
    }

    pub fn displayed_metadata(&self) -> Option<&MetadataRecord> {
        self.session.displayed_metadata()
    }

    pub fn matrix(&self) -> ViewStatus<MatrixView> {
        self.session.matrix_view()
    }

    pub fn metadata_panel(&self) -> ViewStatus<Option<MetadataPanel>> {
        self.session.metadata_panel()
    }

    pub fn deep_link(&self) -> ViewStatus<String> {
        self.session.deep_link()
    }
}

/// A dashboard whose session runs on a background worker. Loads and user
/// events go through the same queue; every change publishes a snapshot.
pub struct DashboardHandle {
    queue: ChannelEventQueue,
    snapshots: watch::Receiver<SessionSnapshot>,
    worker: JoinHandle<Session>,
}

impl DashboardHandle {
    pub fn spawn(source: Arc<dyn DatasetSource>, config: &AppConfig) -> Self {
        Self::spawn_with_diagnostics(source, config, Arc::new(NoopDiagnosticSink))
    }

    pub fn spawn_with_diagnostics(
        source: Arc<dyn DatasetSource>,
        config: &AppConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let session = Session::new(config).with_diagnostics(diagnostics);
        let (worker, snapshots) = SessionWorker::new(rx, session);
        let worker = tokio::spawn(worker.run());
        let queue = ChannelEventQueue::new(tx);

        let mut results = spawn_loads(source, config.dataset.key_field.clone());
        let forward = queue.clone();
        tokio::spawn(async move {
            while let Some(result) = results.recv().await {
                if forward.send(SessionEvent::Loaded(result)).await.is_err() {
                    break;
                }
            }
        });

        Self {
            queue,
            snapshots,
            worker,
        }
    }

    pub async fn send(&self, event: SessionEvent) -> Result<(), DashboardError> {
        Ok(self.queue.send(event).await?)
    }

    pub async fn click(&self, row: &str, col: &str) -> Result<(), DashboardError> {
        self.send(SessionEvent::CellClicked(CellClick::new(row, col)))
            .await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until the published snapshot satisfies `ready`.
    pub async fn wait_for(
        &self,
        mut ready: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, DashboardError> {
        let mut snapshots = self.subscribe();
        let snapshot = snapshots
            .wait_for(|s| ready(s))
            .await
            .map_err(|e| anyhow::anyhow!("session worker stopped: {}", e))?;
        Ok(snapshot.clone())
    }

    /// Stops accepting events and returns the session once every queued
    /// event, including in-flight loads, has been applied.
    pub async fn shutdown(self) -> Result<Session, DashboardError> {
        drop(self.queue);
        Ok(self.worker.await?)
    }
}
