use connectome_core::SegmentId;
use dataset::ConnectivityMatrix;
use serde_json::Value;

/// A clicked heatmap cell. The column is the pre-synaptic axis and is the
/// only coordinate that ever selects a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellClick {
    pub row: SegmentId,
    pub col: SegmentId,
}

impl CellClick {
    pub fn new(row: impl Into<SegmentId>, col: impl Into<SegmentId>) -> Self {
        Self {
            row: row.into(),
            col: col.into(),
        }
    }

    /// Reads the first point of a chart click payload
    /// (`{"points": [{"x": <col>, "y": <row>}]}`).
    pub fn from_plot_event(event: &Value) -> Option<Self> {
        let point = event.get("points")?.as_array()?.first()?;
        let col = SegmentId::from_json(point.get("x")?)?;
        let row = point
            .get("y")
            .and_then(SegmentId::from_json)
            .unwrap_or_else(|| SegmentId::new(""));
        Some(Self { row, col })
    }

    /// Resolves a click given as matrix cell indices.
    pub fn at_cell(matrix: &ConnectivityMatrix, row: usize, col: usize) -> Option<Self> {
        Some(Self {
            row: matrix.row_at(row)?.clone(),
            col: matrix.col_at(col)?.clone(),
        })
    }

    /// The id this click adds to the selection.
    pub fn segment(&self) -> &SegmentId {
        &self.col
    }
}

pub fn resolve_click(clicked_row: &str, clicked_col: &str) -> SegmentId {
    CellClick::new(clicked_row, clicked_col).segment().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectome_core::model::EdgeRecord;
    use serde_json::json;

    #[test]
    fn test_click_resolves_to_column() {
        assert_eq!(resolve_click("1", " 2 ").as_str(), "2");
    }

    #[test]
    fn test_plot_event_with_numeric_axes() {
        let click = CellClick::from_plot_event(&json!({"points": [{"x": 10327, "y": 5, "z": 12}]}))
            .unwrap();
        assert_eq!(click.segment().as_str(), "10327");
        assert_eq!(click.row.as_str(), "5");
    }

    #[test]
    fn test_plot_event_without_points() {
        assert!(CellClick::from_plot_event(&json!({"points": []})).is_none());
        assert!(CellClick::from_plot_event(&json!({})).is_none());
    }

    #[test]
    fn test_click_by_cell_index() {
        let matrix = ConnectivityMatrix::build(&[EdgeRecord::new("1", "2", 5.0)]);
        let click = CellClick::at_cell(&matrix, 0, 0).unwrap();
        assert_eq!(click, CellClick::new("1", "2"));
        assert!(CellClick::at_cell(&matrix, 0, 3).is_none());
    }
}
