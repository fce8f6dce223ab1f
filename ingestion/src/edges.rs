use crate::error::LoadError;
use connectome_core::diagnostics::Dataset;
use connectome_core::model::EdgeRecord;

/// Parses the edge-list document: a JSON array of `{row, col, weight}`.
/// `row` and `col` may be numbers or strings.
pub fn parse_edges(text: &str) -> Result<Vec<EdgeRecord>, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Json {
        dataset: Dataset::Edges,
        source,
    })
}
