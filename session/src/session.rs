use crate::click::CellClick;
use crate::events::SessionEvent;
use crate::selection::Selection;
use crate::state::{LoadState, Readiness, ViewStatus};
use connectome_core::config::{AppConfig, ClearPolicy};
use connectome_core::diagnostics::{
    Dataset, DiagnosticEvent, DiagnosticKind, DiagnosticSink, NoopDiagnosticSink,
};
use connectome_core::model::{EdgeRecord, MetadataRecord};
use connectome_core::SegmentId;
use dataset::{ConnectivityMatrix, DatasetIndex, JoinReport, MetadataIndex};
use ingestion::{LoadError, LoadedDataset, MetadataTable};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use viewer::{DeepLinkCodec, ViewerDocument};

/// Heatmap-ready view of the connectivity matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixView {
    pub rows: Vec<SegmentId>,
    pub cols: Vec<SegmentId>,
    pub weights: Vec<Vec<f64>>,
    /// Column positions of currently selected segments.
    pub selected_cols: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataPanel {
    pub segment: SegmentId,
    pub rows: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub edges: Readiness,
    pub metadata: Readiness,
    pub base_state: Readiness,
    pub selection: Vec<SegmentId>,
    pub selection_display: String,
    pub panel: ViewStatus<Option<MetadataPanel>>,
    pub deep_link: ViewStatus<String>,
}

/// A metadata lookup waiting for the metadata table to arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingDisplay {
    /// From seeding: a miss leaves the panel as it is.
    Seeded(SegmentId),
    /// From a user selection: a miss unsets the panel.
    Selected(SegmentId),
}

/// Everything one dashboard session knows: the three inputs, the join built
/// from them and the user's selection.
///
/// Inputs arrive in any order. Each change runs `reconcile`, which performs
/// whatever derived work has just become possible.
pub struct Session {
    layer_name: String,
    default_segments: Vec<SegmentId>,
    clear_policy: ClearPolicy,
    codec: DeepLinkCodec,
    edges: LoadState<Arc<ConnectivityMatrix>>,
    metadata: LoadState<Arc<MetadataIndex>>,
    base_state: LoadState<ViewerDocument>,
    index: Option<DatasetIndex>,
    join_report: Option<JoinReport>,
    selection: Selection,
    displayed: Option<SegmentId>,
    pending_display: Option<PendingDisplay>,
    seeded: bool,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let default_segments: Vec<SegmentId> = config
            .selection
            .default_segments
            .iter()
            .map(SegmentId::new)
            .collect();

        Self {
            layer_name: config.viewer.layer_name.clone(),
            selection: Selection::new(default_segments.clone()),
            default_segments,
            clear_policy: config.selection.clear_policy,
            codec: DeepLinkCodec::from_config(&config.viewer),
            edges: LoadState::Pending,
            metadata: LoadState::Pending,
            base_state: LoadState::Pending,
            index: None,
            join_report: None,
            displayed: None,
            pending_display: None,
            seeded: false,
            diagnostics: Arc::new(NoopDiagnosticSink),
        }
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Loaded(Ok(loaded)) => self.dataset_loaded(loaded),
            SessionEvent::Loaded(Err(err)) => self.load_failed(err),
            SessionEvent::CellClicked(click) => {
                self.click(&click);
            }
            SessionEvent::Add(id) => self.add(id),
            SessionEvent::Reset => self.reset(),
            SessionEvent::Clear => self.clear(),
        }
    }

    // ---- inputs ----

    pub fn dataset_loaded(&mut self, loaded: LoadedDataset) {
        match loaded {
            LoadedDataset::Edges(edges) => self.edges_loaded(&edges),
            LoadedDataset::Metadata(table) => self.metadata_loaded(table),
            LoadedDataset::ViewerState(document) => self.base_state_loaded(document),
        }
    }

    pub fn edges_loaded(&mut self, edges: &[EdgeRecord]) {
        if !self.accepts(Dataset::Edges) {
            return;
        }
        let matrix = ConnectivityMatrix::build(edges);
        info!(
            "Connectivity matrix ready: {} rows x {} cols",
            matrix.row_ids().len(),
            matrix.col_ids().len()
        );
        self.edges = LoadState::Ready(Arc::new(matrix));
        self.reconcile();
    }

    pub fn metadata_loaded(&mut self, table: MetadataTable) {
        if !self.accepts(Dataset::Metadata) {
            return;
        }
        let index = MetadataIndex::from_table(table);
        info!(
            "Metadata ready: {} segments, {} fields",
            index.len(),
            index.headers().len()
        );
        self.metadata = LoadState::Ready(Arc::new(index));
        self.reconcile();
    }

    pub fn base_state_loaded(&mut self, document: Value) {
        if !self.accepts(Dataset::ViewerState) {
            return;
        }
        let document = ViewerDocument::new(document, self.layer_name.clone());
        info!(
            "Viewer state ready, segment convention {:?}",
            document.convention()
        );
        self.base_state = LoadState::Ready(document);
        self.reconcile();
    }

    pub fn load_failed(&mut self, err: LoadError) {
        let dataset = err.dataset();
        if !self.accepts(dataset) {
            return;
        }
        warn!("Failed to load {}: {}", dataset, err);
        self.emit(
            DiagnosticEvent::new(DiagnosticKind::LoadFailed, dataset).with_detail(err.to_string()),
        );

        let err = Arc::new(err);
        match dataset {
            Dataset::Edges => self.edges = LoadState::Failed(err),
            Dataset::Metadata => self.metadata = LoadState::Failed(err),
            Dataset::ViewerState => self.base_state = LoadState::Failed(err),
        }
        self.reconcile();
    }

    fn accepts(&self, dataset: Dataset) -> bool {
        let pending = match dataset {
            Dataset::Edges => self.edges.is_pending(),
            Dataset::Metadata => self.metadata.is_pending(),
            Dataset::ViewerState => self.base_state.is_pending(),
        };
        if !pending {
            warn!("Ignoring repeated {} load", dataset);
        }
        pending
    }

    /// Runs every derived step whose inputs are now available. Each step
    /// happens at most once.
    fn reconcile(&mut self) {
        if self.index.is_none() {
            if let (Some(matrix), Some(metadata)) = (self.edges.ready(), self.metadata.ready()) {
                let index = DatasetIndex::from_parts(matrix.clone(), metadata.clone());
                let report = index.report(self.diagnostics.as_ref());
                info!(
                    "Dataset index built: {} of {} columns have metadata",
                    report.overlap, report.matrix_columns
                );
                self.join_report = Some(report);
                self.index = Some(index);
            }
        }

        if !self.seeded {
            if let Some(base) = self.base_state.ready() {
                let has_layer = base.has_layer();
                let segments = base.layer_segments();
                self.seed(has_layer, segments);
            }
        }

        match &self.metadata {
            LoadState::Ready(metadata) => match self.pending_display.take() {
                Some(PendingDisplay::Seeded(id)) => {
                    if metadata.contains(id.as_str()) {
                        self.displayed = Some(id);
                    }
                }
                Some(PendingDisplay::Selected(id)) => {
                    self.displayed = metadata.contains(id.as_str()).then_some(id);
                }
                None => {}
            },
            LoadState::Failed(_) => self.pending_display = None,
            LoadState::Pending => {}
        }
    }

    // ---- selection ----

    /// Replaces the selection with the named layer's segments. Without the
    /// layer, or without a `segments` field, the selection is kept.
    ///
    /// Runs by itself once the base document loads; calling it again later
    /// discards the user's edits.
    pub fn initialize_from(&mut self, document: &ViewerDocument) {
        self.seed(document.has_layer(), document.layer_segments());
        self.reconcile();
    }

    fn seed(&mut self, has_layer: bool, segments: Option<Vec<SegmentId>>) {
        self.seeded = true;
        match segments {
            Some(ids) => {
                self.selection.replace(ids);
                info!("Selection seeded from viewer state: [{}]", self.selection.display());
                self.pending_display = self.selection.first().cloned().map(PendingDisplay::Seeded);
            }
            None if !has_layer => {
                warn!(
                    "Layer {} not found in viewer state, keeping default selection",
                    self.layer_name
                );
                self.emit(
                    DiagnosticEvent::new(DiagnosticKind::MissingLayer, Dataset::ViewerState)
                        .with_detail(self.layer_name.clone()),
                );
            }
            None => debug!("Layer {} has no segments", self.layer_name),
        }
    }

    /// Adds `id` and points the metadata panel at it.
    pub fn add(&mut self, id: SegmentId) {
        if id.is_empty() {
            return;
        }
        if self.selection.add(id.clone()) {
            debug!(segment = %id, "segment selected");
        }
        self.show(id);
    }

    /// Selects the clicked column. Returns the selected id.
    pub fn click(&mut self, click: &CellClick) -> SegmentId {
        let id = click.segment().clone();
        self.add(id.clone());
        id
    }

    pub fn reset(&mut self) {
        self.selection.replace(self.default_segments.clone());
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        if self.clear_policy == ClearPolicy::Unset {
            self.displayed = None;
            self.pending_display = None;
        }
    }

    fn show(&mut self, id: SegmentId) {
        match &self.metadata {
            LoadState::Ready(metadata) => {
                self.pending_display = None;
                self.displayed = metadata.contains(id.as_str()).then_some(id);
            }
            LoadState::Pending => self.pending_display = Some(PendingDisplay::Selected(id)),
            LoadState::Failed(_) => {}
        }
    }

    fn emit(&self, event: DiagnosticEvent) {
        if let Err(err) = self.diagnostics.record(event) {
            warn!("Failed to record diagnostic: {}", err);
        }
    }

    // ---- views ----

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_display(&self) -> String {
        self.selection.display()
    }

    pub fn displayed_segment(&self) -> Option<&SegmentId> {
        self.displayed.as_ref()
    }

    pub fn displayed_metadata(&self) -> Option<&MetadataRecord> {
        let id = self.displayed.as_ref()?;
        self.metadata.ready()?.get(id.as_str())
    }

    /// The connectivity matrix once edges have loaded.
    pub fn matrix(&self) -> Option<&ConnectivityMatrix> {
        self.edges.ready().map(Arc::as_ref)
    }

    pub fn index(&self) -> Option<&DatasetIndex> {
        self.index.as_ref()
    }

    pub fn join_report(&self) -> Option<&JoinReport> {
        self.join_report.as_ref()
    }

    pub fn base_document(&self) -> Option<&ViewerDocument> {
        self.base_state.ready()
    }

    pub fn is_ready(&self) -> bool {
        self.edges.ready().is_some()
            && self.metadata.ready().is_some()
            && self.base_state.ready().is_some()
    }

    pub fn matrix_view(&self) -> ViewStatus<MatrixView> {
        self.edges.view(|matrix| MatrixView {
            rows: matrix.row_ids().to_vec(),
            cols: matrix.col_ids().to_vec(),
            weights: matrix.dense(),
            selected_cols: matrix
                .col_ids()
                .iter()
                .enumerate()
                .filter(|(_, col)| self.selection.contains(col.as_str()))
                .map(|(i, _)| i)
                .collect(),
        })
    }

    pub fn metadata_panel(&self) -> ViewStatus<Option<MetadataPanel>> {
        self.metadata.view(|metadata| {
            self.displayed
                .as_ref()
                .and_then(|id| metadata.get(id.as_str()))
                .map(|record| MetadataPanel {
                    segment: record.key().clone(),
                    rows: record.display_rows(),
                })
        })
    }

    /// Recomputed on every call from the base document and the selection.
    pub fn deep_link(&self) -> ViewStatus<String> {
        self.base_state
            .view(|base| self.codec.encode(base, self.selection.ids()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            edges: self.edges.readiness(),
            metadata: self.metadata.readiness(),
            base_state: self.base_state.readiness(),
            selection: self.selection.ids().to_vec(),
            selection_display: self.selection.display(),
            panel: self.metadata_panel(),
            deep_link: self.deep_link(),
        }
    }
}
