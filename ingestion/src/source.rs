use crate::edges::parse_edges;
use crate::error::LoadError;
use crate::metadata::{parse_metadata, MetadataTable};
use crate::viewer_state::parse_viewer_state;
use connectome_core::config::SourcesConfig;
use connectome_core::diagnostics::Dataset;
use connectome_core::model::EdgeRecord;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Where the raw text of each dataset comes from.
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self, dataset: Dataset) -> anyhow::Result<String>;
}

/// Reads the three documents from a directory.
pub struct FileSource {
    root: PathBuf,
    sources: SourcesConfig,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, sources: SourcesConfig) -> Self {
        Self {
            root: root.into(),
            sources,
        }
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        let name = match dataset {
            Dataset::Edges => &self.sources.edges_path,
            Dataset::Metadata => &self.sources.metadata_path,
            Dataset::ViewerState => &self.sources.state_path,
        };
        self.root.join(name)
    }
}

#[async_trait::async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self, dataset: Dataset) -> anyhow::Result<String> {
        let path = self.path_for(dataset);
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(text)
    }
}

/// Serves fixed documents from memory, optionally after a per-dataset delay.
/// A dataset without a document fails to fetch.
#[derive(Default)]
pub struct InMemorySource {
    documents: HashMap<Dataset, String>,
    delays: HashMap<Dataset, Duration>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, dataset: Dataset, text: impl Into<String>) -> Self {
        self.documents.insert(dataset, text.into());
        self
    }

    pub fn with_delay(mut self, dataset: Dataset, delay: Duration) -> Self {
        self.delays.insert(dataset, delay);
        self
    }
}

#[async_trait::async_trait]
impl DatasetSource for InMemorySource {
    async fn fetch(&self, dataset: Dataset) -> anyhow::Result<String> {
        if let Some(delay) = self.delays.get(&dataset) {
            tokio::time::sleep(*delay).await;
        }
        self.documents
            .get(&dataset)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no document registered for {}", dataset))
    }
}

/// A successfully loaded and parsed dataset.
#[derive(Debug, Clone)]
pub enum LoadedDataset {
    Edges(Vec<EdgeRecord>),
    Metadata(MetadataTable),
    ViewerState(Value),
}

impl LoadedDataset {
    pub fn dataset(&self) -> Dataset {
        match self {
            LoadedDataset::Edges(_) => Dataset::Edges,
            LoadedDataset::Metadata(_) => Dataset::Metadata,
            LoadedDataset::ViewerState(_) => Dataset::ViewerState,
        }
    }
}

/// Fetches and parses one dataset.
pub async fn load(
    source: &dyn DatasetSource,
    dataset: Dataset,
    key_field: &str,
) -> Result<LoadedDataset, LoadError> {
    let text = source
        .fetch(dataset)
        .await
        .map_err(|source| LoadError::Fetch { dataset, source })?;

    let loaded = match dataset {
        Dataset::Edges => LoadedDataset::Edges(parse_edges(&text)?),
        Dataset::Metadata => LoadedDataset::Metadata(parse_metadata(&text, key_field)?),
        Dataset::ViewerState => LoadedDataset::ViewerState(parse_viewer_state(&text)?),
    };

    info!("Loaded {} ({} bytes)", dataset, text.len());
    Ok(loaded)
}
