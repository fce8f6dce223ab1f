use crate::click::CellClick;
use connectome_core::SegmentId;
use ingestion::{LoadError, LoadedDataset};
use tokio::sync::mpsc;

/// Discrete inputs a session reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    Loaded(Result<LoadedDataset, LoadError>),
    CellClicked(CellClick),
    Add(SegmentId),
    Reset,
    Clear,
}

#[async_trait::async_trait]
pub trait EventQueue: Send + Sync {
    async fn send(&self, event: SessionEvent) -> anyhow::Result<()>;
}

/// In-memory queue feeding a `SessionWorker` through a Tokio channel.
#[derive(Clone)]
pub struct ChannelEventQueue {
    sender: mpsc::Sender<SessionEvent>,
}

impl ChannelEventQueue {
    pub fn new(sender: mpsc::Sender<SessionEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait::async_trait]
impl EventQueue for ChannelEventQueue {
    async fn send(&self, event: SessionEvent) -> anyhow::Result<()> {
        self.sender
            .send(event)
            .await
            .map_err(|e| anyhow::anyhow!("Session queue send error: {}", e))
    }
}
