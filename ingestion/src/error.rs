use connectome_core::diagnostics::Dataset;
use connectome_core::error::{ConnectomeError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch {dataset}: {source}")]
    Fetch {
        dataset: Dataset,
        source: anyhow::Error,
    },
    #[error("invalid JSON in {dataset}: {source}")]
    Json {
        dataset: Dataset,
        source: serde_json::Error,
    },
    #[error("invalid metadata CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("metadata header has no `{0}` column")]
    MissingKeyColumn(String),
    #[error("invalid {dataset} document: {reason}")]
    Shape { dataset: Dataset, reason: String },
}

impl LoadError {
    pub fn dataset(&self) -> Dataset {
        match self {
            LoadError::Fetch { dataset, .. }
            | LoadError::Json { dataset, .. }
            | LoadError::Shape { dataset, .. } => *dataset,
            LoadError::Csv(_) | LoadError::MissingKeyColumn(_) => Dataset::Metadata,
        }
    }
}

impl ConnectomeError for LoadError {
    fn error_code(&self) -> ErrorCode {
        match self {
            LoadError::Fetch { source, .. } => match source.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => ErrorCode::NotFound,
                _ => ErrorCode::Unavailable,
            },
            LoadError::Json { .. }
            | LoadError::Csv(_)
            | LoadError::MissingKeyColumn(_)
            | LoadError::Shape { .. } => ErrorCode::InvalidArgument,
        }
    }
}
