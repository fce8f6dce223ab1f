use crate::matrix::ConnectivityMatrix;
use crate::metadata::MetadataIndex;
use connectome_core::diagnostics::{Dataset, DiagnosticEvent, DiagnosticKind, DiagnosticSink};
use connectome_core::model::{EdgeRecord, MetadataRecord};
use connectome_core::SegmentId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Overlap between matrix columns and metadata keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct JoinReport {
    pub matrix_columns: usize,
    pub metadata_keys: usize,
    pub overlap: usize,
    /// Columns without a metadata row, in column order.
    pub columns_without_metadata: Vec<SegmentId>,
    pub metadata_without_column: usize,
}

/// Read-only join of the connectivity matrix and the metadata table.
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    matrix: Arc<ConnectivityMatrix>,
    metadata: Arc<MetadataIndex>,
}

impl DatasetIndex {
    pub fn build(edges: &[EdgeRecord], metadata: Vec<MetadataRecord>) -> Self {
        Self::from_parts(
            Arc::new(ConnectivityMatrix::build(edges)),
            Arc::new(MetadataIndex::build(metadata)),
        )
    }

    pub fn from_parts(matrix: Arc<ConnectivityMatrix>, metadata: Arc<MetadataIndex>) -> Self {
        Self { matrix, metadata }
    }

    pub fn matrix(&self) -> &ConnectivityMatrix {
        &self.matrix
    }

    pub fn metadata(&self) -> &MetadataIndex {
        &self.metadata
    }

    pub fn row_ids(&self) -> &[SegmentId] {
        self.matrix.row_ids()
    }

    pub fn col_ids(&self) -> &[SegmentId] {
        self.matrix.col_ids()
    }

    pub fn weight(&self, row: &str, col: &str) -> f64 {
        self.matrix.weight(row, col)
    }

    pub fn metadata_for(&self, id: &str) -> Option<&MetadataRecord> {
        self.metadata.get(id)
    }

    pub fn join_report(&self) -> JoinReport {
        let columns_without_metadata: Vec<SegmentId> = self
            .matrix
            .col_ids()
            .iter()
            .filter(|col| !self.metadata.contains(col.as_str()))
            .cloned()
            .collect();
        let matrix_columns = self.matrix.col_ids().len();
        let metadata_without_column = self
            .metadata
            .keys()
            .filter(|key| !self.matrix.has_col(key.as_str()))
            .count();

        JoinReport {
            matrix_columns,
            metadata_keys: self.metadata.len(),
            overlap: matrix_columns - columns_without_metadata.len(),
            columns_without_metadata,
            metadata_without_column,
        }
    }

    /// Logs the join and emits one diagnostic per missed column, per
    /// malformed metadata row and per duplicated key. Never fails.
    pub fn report(&self, sink: &dyn DiagnosticSink) -> JoinReport {
        let report = self.join_report();
        debug!(
            columns = report.matrix_columns,
            metadata_keys = report.metadata_keys,
            overlap = report.overlap,
            "dataset join"
        );

        for col in &report.columns_without_metadata {
            debug!(segment = %col, "matrix column has no metadata");
            emit(
                sink,
                DiagnosticEvent::new(DiagnosticKind::JoinMiss, Dataset::Metadata)
                    .with_segment(col.as_str()),
            );
        }
        if report.metadata_without_column > 0 {
            emit(
                sink,
                DiagnosticEvent::new(DiagnosticKind::JoinMiss, Dataset::Edges).with_detail(
                    format!("{} metadata rows match no column", report.metadata_without_column),
                ),
            );
        }
        for row in self.metadata.malformed_rows() {
            emit(
                sink,
                DiagnosticEvent::new(DiagnosticKind::MalformedRecord, Dataset::Metadata)
                    .with_detail(format!("row {} has an empty key", row + 1)),
            );
        }
        for key in self.metadata.duplicate_keys() {
            emit(
                sink,
                DiagnosticEvent::new(DiagnosticKind::MalformedRecord, Dataset::Metadata)
                    .with_segment(key.as_str())
                    .with_detail("duplicate key, first row kept"),
            );
        }
        if self.matrix.duplicate_edges() > 0 {
            emit(
                sink,
                DiagnosticEvent::new(DiagnosticKind::MalformedRecord, Dataset::Edges).with_detail(
                    format!("{} duplicate edges ignored", self.matrix.duplicate_edges()),
                ),
            );
        }

        report
    }
}

fn emit(sink: &dyn DiagnosticSink, event: DiagnosticEvent) {
    if let Err(err) = sink.record(event) {
        warn!("Failed to record diagnostic: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectome_core::diagnostics::InMemoryDiagnosticSink;

    fn record(key: &str) -> MetadataRecord {
        MetadataRecord::from_pairs("bodyId_post", vec![("bodyId_post", Some(key))])
    }

    #[test]
    fn test_join_report_counts_overlap() {
        let index = DatasetIndex::build(
            &[EdgeRecord::new("1", "2", 5.0), EdgeRecord::new("1", "3", 1.0)],
            vec![record("2"), record("7")],
        );
        let report = index.join_report();
        assert_eq!(report.matrix_columns, 2);
        assert_eq!(report.overlap, 1);
        assert_eq!(report.columns_without_metadata, vec![SegmentId::new("3")]);
        assert_eq!(report.metadata_without_column, 1);
    }

    #[test]
    fn test_report_emits_diagnostics_without_failing() {
        let index = DatasetIndex::build(
            &[EdgeRecord::new("1", "2", 5.0)],
            vec![record(""), record("9"), record("9")],
        );
        let sink = InMemoryDiagnosticSink::default();
        index.report(&sink);

        // column "2" has no metadata, and key "9" has no column
        assert_eq!(sink.count(DiagnosticKind::JoinMiss), 2);
        // empty key + duplicate key
        assert_eq!(sink.count(DiagnosticKind::MalformedRecord), 2);
    }
}
