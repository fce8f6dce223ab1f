use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Edges,
    Metadata,
    ViewerState,
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Dataset::Edges => "edges",
            Dataset::Metadata => "metadata",
            Dataset::ViewerState => "viewer_state",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A matrix column without metadata, or a metadata key without a column.
    JoinMiss,
    /// The configured layer is not present in the viewer state.
    MissingLayer,
    /// A metadata row whose key is empty after normalization.
    MalformedRecord,
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub sequence: u64,
    pub kind: DiagnosticKind,
    pub dataset: Dataset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DiagnosticEvent {
    pub fn new(kind: DiagnosticKind, dataset: Dataset) -> Self {
        Self {
            sequence: 0,
            kind,
            dataset,
            segment_id: None,
            detail: None,
        }
    }

    pub fn with_segment(mut self, segment_id: impl Into<String>) -> Self {
        self.segment_id = Some(segment_id.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("diagnostic sink lock poisoned")]
    LockPoisoned,
    #[error("diagnostic io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("diagnostic serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent) -> Result<(), DiagnosticError>;
}

#[derive(Default)]
pub struct InMemoryDiagnosticSink {
    events: Mutex<Vec<DiagnosticEvent>>,
    sequence: AtomicU64,
}

impl InMemoryDiagnosticSink {
    pub fn events(&self) -> Result<Vec<DiagnosticEvent>, DiagnosticError> {
        let events = self
            .events
            .lock()
            .map_err(|_| DiagnosticError::LockPoisoned)?;
        Ok(events.clone())
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| e.kind == kind).count())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for InMemoryDiagnosticSink {
    fn record(&self, mut event: DiagnosticEvent) -> Result<(), DiagnosticError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        event.sequence = next;
        let mut events = self
            .events
            .lock()
            .map_err(|_| DiagnosticError::LockPoisoned)?;
        events.push(event);
        Ok(())
    }
}

pub struct JsonlDiagnosticSink {
    writer: Mutex<std::fs::File>,
    sequence: AtomicU64,
}

impl JsonlDiagnosticSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiagnosticError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;

        Ok(Self {
            writer: Mutex::new(writer),
            sequence: AtomicU64::new(0),
        })
    }
}

impl DiagnosticSink for JsonlDiagnosticSink {
    fn record(&self, mut event: DiagnosticEvent) -> Result<(), DiagnosticError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        event.sequence = next;

        let line = serde_json::to_string(&event)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DiagnosticError::LockPoisoned)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Discards every event. Used when no sink is configured.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: DiagnosticEvent) -> Result<(), DiagnosticError> {
        Ok(())
    }
}
