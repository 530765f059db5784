//! Error types for the randomization engine.
//!
//! Every variant carries the quantities a caller needs to build its own
//! diagnostic; none of them are plain strings.

use thiserror::Error;

/// Geometry or replicate failures detected before any randomization work.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    #[error("invalid {field}: {value} (must be a positive, finite number)")]
    InvalidDimension { field: &'static str, value: f64 },

    #[error("{axis} count {ratio} is too large for a field grid")]
    GridTooLarge { axis: &'static str, ratio: f64 },

    #[error("degenerate grid: spacing yields {rows} row(s) and {cols} column(s)")]
    DegenerateGrid { rows: usize, cols: usize },

    #[error(
        "grid has {rows} x {cols} = {} cells but treatments sum to {total}",
        cell_count(.rows, .cols)
    )]
    DesignMismatch { rows: usize, cols: usize, total: u64 },
}

impl DesignError {
    /// Cell count for `DesignMismatch`, `None` for the other variants.
    pub fn cells(&self) -> Option<u64> {
        match self {
            Self::DesignMismatch { rows, cols, .. } => Some(cell_count(rows, cols)),
            _ => None,
        }
    }
}

fn cell_count(rows: &usize, cols: &usize) -> u64 {
    *rows as u64 * *cols as u64
}

/// Violations of the treatment-list construction rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreatmentError {
    #[error("treatment code is empty")]
    EmptyCode,

    #[error("treatment code {code:?} contains a control character")]
    ControlCharacter { code: String },

    #[error("treatment code `{code}` appears more than once")]
    DuplicateCode { code: String },

    #[error("treatment `{code}` has zero replicates")]
    ZeroReplicates { code: String },

    #[error("no treatments given")]
    NoTreatments,
}

/// Shape errors raised when a grid is assembled from flat cells or labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("expected {expected} cells for the grid, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} label at position {index} is `{found}`, expected `{expected}`")]
    BadLabel {
        kind: &'static str,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("grid must have at least one row and one column")]
    Empty,
}

/// Everything `randomize` can fail with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RandomizeError {
    #[error(transparent)]
    Design(#[from] DesignError),

    /// Assembly failed after validation passed. This is a defect, not an
    /// input problem.
    #[error("internal invariant violated while assembling the field map: {0}")]
    Invariant(#[from] LayoutError),
}

impl RandomizeError {
    /// The design error, if this is a user-correctable failure.
    pub fn as_design(&self) -> Option<&DesignError> {
        match self {
            Self::Design(err) => Some(err),
            Self::Invariant(_) => None,
        }
    }
}
