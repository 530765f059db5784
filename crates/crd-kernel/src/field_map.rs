//! FieldMap: the labeled treatment grid produced by a randomization.
//!
//! Cells are stored row-major. Row labels are `Row1..RowN` and column labels
//! `Pos1..PosM`; they identify position only and are checked whenever a map
//! is rebuilt from outside data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::GridDims;
use crate::treatment::TreatmentCode;

/// Label for the zero-based row index `i`.
pub fn row_label(i: usize) -> String {
    format!("Row{}", i + 1)
}

/// Label for the zero-based column index `j`.
pub fn col_label(j: usize) -> String {
    format!("Pos{}", j + 1)
}

/// An immutable rows x cols grid of treatment codes with positional labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldMapData", into = "FieldMapData")]
pub struct FieldMap {
    dims: GridDims,
    cells: Vec<TreatmentCode>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

impl FieldMap {
    /// Reshape a flat sequence into `dims`, first `cols` cells forming row 1.
    ///
    /// The sequence must fill the grid exactly.
    pub fn from_row_major(cells: Vec<TreatmentCode>, dims: GridDims) -> Result<Self, LayoutError> {
        if dims.rows == 0 || dims.cols == 0 {
            return Err(LayoutError::Empty);
        }
        let expected = dims.rows * dims.cols;
        if cells.len() != expected {
            return Err(LayoutError::ShapeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            dims,
            cells,
            row_labels: (0..dims.rows).map(row_label).collect(),
            col_labels: (0..dims.cols).map(col_label).collect(),
        })
    }

    /// Build from nested rows, all of which must have the same length.
    pub fn from_rows(grid: Vec<Vec<TreatmentCode>>) -> Result<Self, LayoutError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);

        let mut cells = Vec::with_capacity(rows * cols);
        for (i, row) in grid.into_iter().enumerate() {
            if row.len() != cols {
                return Err(LayoutError::RaggedRow {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            cells.extend(row);
        }

        Self::from_row_major(cells, GridDims { rows, cols })
    }

    /// Build from nested rows and check that the supplied labels are exactly
    /// the positional labels for that shape.
    pub fn with_labels(
        row_labels: &[String],
        col_labels: &[String],
        grid: Vec<Vec<TreatmentCode>>,
    ) -> Result<Self, LayoutError> {
        let map = Self::from_rows(grid)?;
        check_labels("row", row_labels, &map.row_labels)?;
        check_labels("column", col_labels, &map.col_labels)?;
        Ok(map)
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[TreatmentCode] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TreatmentCode> {
        if row >= self.dims.rows || col >= self.dims.cols {
            return None;
        }
        self.cells.get(row * self.dims.cols + col)
    }

    pub fn row(&self, row: usize) -> Option<&[TreatmentCode]> {
        if row >= self.dims.rows {
            return None;
        }
        let start = row * self.dims.cols;
        Some(&self.cells[start..start + self.dims.cols])
    }

    /// Rows in order, paired with their labels.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[TreatmentCode])> {
        self.row_labels
            .iter()
            .map(String::as_str)
            .zip(self.cells.chunks_exact(self.dims.cols))
    }

    /// Plot count per code, in order of first appearance in the grid.
    pub fn tally(&self) -> Vec<(TreatmentCode, usize)> {
        let mut counts: Vec<(TreatmentCode, usize)> = Vec::new();
        for code in &self.cells {
            match counts.iter_mut().find(|(c, _)| c == code) {
                Some((_, n)) => *n += 1,
                None => counts.push((code.clone(), 1)),
            }
        }
        counts
    }

    /// Number of plots holding `code`.
    pub fn count(&self, code: &str) -> usize {
        self.cells.iter().filter(|c| c.as_str() == code).count()
    }
}

fn check_labels(kind: &'static str, found: &[String], expected: &[String]) -> Result<(), LayoutError> {
    if found.len() != expected.len() {
        return Err(LayoutError::ShapeMismatch {
            expected: expected.len(),
            actual: found.len(),
        });
    }
    for (index, (f, e)) in found.iter().zip(expected).enumerate() {
        if f != e {
            return Err(LayoutError::BadLabel {
                kind,
                index,
                expected: e.clone(),
                found: f.clone(),
            });
        }
    }
    Ok(())
}

/// Serialized form: labels plus nested rows.
#[derive(Serialize, Deserialize)]
struct FieldMapData {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    grid: Vec<Vec<TreatmentCode>>,
}

impl TryFrom<FieldMapData> for FieldMap {
    type Error = LayoutError;

    fn try_from(data: FieldMapData) -> Result<Self, Self::Error> {
        Self::with_labels(&data.row_labels, &data.col_labels, data.grid)
    }
}

impl From<FieldMap> for FieldMapData {
    fn from(map: FieldMap) -> Self {
        let grid = map
            .cells
            .chunks_exact(map.dims.cols)
            .map(<[TreatmentCode]>::to_vec)
            .collect();
        Self {
            row_labels: map.row_labels,
            col_labels: map.col_labels,
            grid,
        }
    }
}

impl fmt::Display for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Field map {}x{}", self.dims.rows, self.dims.cols)?;
        for (label, row) in self.iter_rows() {
            write!(f, "  {}:", label)?;
            for code in row {
                write!(f, " {}", code)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(s: &str) -> Vec<TreatmentCode> {
        s.split_whitespace()
            .map(|c| TreatmentCode::new(c).unwrap())
            .collect()
    }

    fn sample() -> FieldMap {
        FieldMap::from_row_major(codes("A B C B C A"), GridDims { rows: 2, cols: 3 }).unwrap()
    }

    #[test]
    fn test_row_major_fill() {
        let map = sample();
        assert_eq!(map.row(0).unwrap(), codes("A B C").as_slice());
        assert_eq!(map.row(1).unwrap(), codes("B C A").as_slice());
        assert_eq!(map.cell(1, 2).unwrap().as_str(), "A");
        assert!(map.cell(2, 0).is_none());
        assert!(map.cell(0, 3).is_none());
        assert!(map.row(2).is_none());
    }

    #[test]
    fn test_labels() {
        let map = FieldMap::from_row_major(
            codes("A A A A A A A A A A A A"),
            GridDims { rows: 3, cols: 4 },
        )
        .unwrap();
        assert_eq!(map.row_labels(), ["Row1", "Row2", "Row3"]);
        assert_eq!(map.col_labels(), ["Pos1", "Pos2", "Pos3", "Pos4"]);
    }

    #[test]
    fn test_single_cell_labels() {
        let map = FieldMap::from_row_major(codes("X"), GridDims { rows: 1, cols: 1 }).unwrap();
        assert_eq!(map.row_labels(), ["Row1"]);
        assert_eq!(map.col_labels(), ["Pos1"]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = FieldMap::from_row_major(codes("A B C"), GridDims { rows: 2, cols: 2 }).unwrap_err();
        assert_eq!(
            err,
            LayoutError::ShapeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FieldMap::from_rows(vec![codes("A B"), codes("A")]).unwrap_err();
        assert!(matches!(err, LayoutError::RaggedRow { row: 1, .. }));
        assert_eq!(FieldMap::from_rows(Vec::new()).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn test_wrong_label_rejected() {
        let rows = vec!["Row1".to_string(), "Row3".to_string()];
        let cols: Vec<String> = (0..3).map(col_label).collect();
        let err = FieldMap::with_labels(&rows, &cols, vec![codes("A B C"), codes("B C A")]).unwrap_err();
        assert!(matches!(err, LayoutError::BadLabel { kind: "row", index: 1, .. }));
    }

    #[test]
    fn test_tally_in_first_appearance_order() {
        let map = FieldMap::from_row_major(codes("C A C B"), GridDims { rows: 2, cols: 2 }).unwrap();
        let tally: Vec<(String, usize)> = map
            .tally()
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        assert_eq!(
            tally,
            vec![("C".to_string(), 2), ("A".to_string(), 1), ("B".to_string(), 1)]
        );
        assert_eq!(map.count("C"), 2);
        assert_eq!(map.count("Z"), 0);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["row_labels"], serde_json::json!(["Row1", "Row2"]));
        assert_eq!(json["col_labels"], serde_json::json!(["Pos1", "Pos2", "Pos3"]));
        assert_eq!(json["grid"][1], serde_json::json!(["B", "C", "A"]));

        let back: FieldMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert_eq!(text, "Field map 2x3\n  Row1: A B C\n  Row2: B C A\n");
    }
}
