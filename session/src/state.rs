use connectome_core::diagnostics::Dataset;
use connectome_core::error::{ConnectomeError, ErrorCode};
use ingestion::LoadError;
use serde::Serialize;
use std::sync::Arc;

/// Availability of one input dataset.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Pending,
    Ready(T),
    Failed(Arc<LoadError>),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Pending
    }
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn readiness(&self) -> Readiness {
        match self {
            LoadState::Pending => Readiness::Pending,
            LoadState::Ready(_) => Readiness::Ready,
            LoadState::Failed(_) => Readiness::Failed,
        }
    }

    /// Maps a ready value into a view, passing loading and failure through.
    pub fn view<U>(&self, f: impl FnOnce(&T) -> U) -> ViewStatus<U> {
        match self {
            LoadState::Pending => ViewStatus::Loading,
            LoadState::Ready(value) => ViewStatus::Ready(f(value)),
            LoadState::Failed(err) => ViewStatus::Failed(ViewError::from(err.as_ref())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub dataset: Dataset,
    pub code: ErrorCode,
    pub message: String,
}

impl From<&LoadError> for ViewError {
    fn from(err: &LoadError) -> Self {
        Self {
            dataset: err.dataset(),
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

/// What a consumer of one or more datasets can show right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ViewStatus<T> {
    Loading,
    Failed(ViewError),
    Ready(T),
}

impl<T> ViewStatus<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ViewStatus::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewStatus::Failed(_))
    }
}
