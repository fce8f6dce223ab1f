use connectome_core::ids::normalize;
use connectome_core::model::EdgeRecord;
use connectome_core::SegmentId;
use std::collections::HashMap;

/// Dense weight matrix over the distinct row and column ids of an edge list.
///
/// Axes keep first-seen order. A cell without an edge holds 0. When the edge
/// list repeats a (row, col) pair the first record wins.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMatrix {
    rows: Vec<SegmentId>,
    cols: Vec<SegmentId>,
    row_pos: HashMap<SegmentId, usize>,
    col_pos: HashMap<SegmentId, usize>,
    weights: Vec<f64>,
    duplicate_edges: usize,
}

impl ConnectivityMatrix {
    pub fn build(edges: &[EdgeRecord]) -> Self {
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut row_pos = HashMap::new();
        let mut col_pos = HashMap::new();

        for edge in edges {
            if !row_pos.contains_key(&edge.row) {
                row_pos.insert(edge.row.clone(), rows.len());
                rows.push(edge.row.clone());
            }
            if !col_pos.contains_key(&edge.col) {
                col_pos.insert(edge.col.clone(), cols.len());
                cols.push(edge.col.clone());
            }
        }

        let width = cols.len();
        let mut cells: Vec<Option<f64>> = vec![None; rows.len() * width];
        let mut duplicate_edges = 0;
        for edge in edges {
            let cell = &mut cells[row_pos[&edge.row] * width + col_pos[&edge.col]];
            if cell.is_some() {
                duplicate_edges += 1;
            } else {
                *cell = Some(edge.weight);
            }
        }

        Self {
            rows,
            cols,
            row_pos,
            col_pos,
            weights: cells.into_iter().map(|w| w.unwrap_or(0.0)).collect(),
            duplicate_edges,
        }
    }

    pub fn row_ids(&self) -> &[SegmentId] {
        &self.rows
    }

    pub fn col_ids(&self) -> &[SegmentId] {
        &self.cols
    }

    pub fn has_col(&self, id: &str) -> bool {
        self.col_pos.contains_key(normalize(id))
    }

    pub fn col_at(&self, index: usize) -> Option<&SegmentId> {
        self.cols.get(index)
    }

    pub fn row_at(&self, index: usize) -> Option<&SegmentId> {
        self.rows.get(index)
    }

    /// Weight of the (row, col) cell, 0 when no edge connects them.
    pub fn weight(&self, row: &str, col: &str) -> f64 {
        let row = SegmentId::new(row);
        let col = SegmentId::new(col);
        match (self.row_pos.get(&row), self.col_pos.get(&col)) {
            (Some(r), Some(c)) => self.weights[r * self.cols.len() + c],
            _ => 0.0,
        }
    }

    /// Rows of weights in axis order, ready for a heatmap.
    pub fn dense(&self) -> Vec<Vec<f64>> {
        if self.cols.is_empty() {
            return vec![Vec::new(); self.rows.len()];
        }
        self.weights
            .chunks(self.cols.len())
            .map(<[f64]>::to_vec)
            .collect()
    }

    pub fn duplicate_edges(&self) -> usize {
        self.duplicate_edges
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
