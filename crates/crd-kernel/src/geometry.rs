//! Field geometry and grid dimension derivation.

use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// Physical size of the field and plot spacing, all in one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    /// Extent along the rows (columns are laid out along this axis)
    pub length: f64,
    /// Extent across the rows
    pub width: f64,
    /// Distance between plots within a row
    pub in_row_spacing: f64,
    /// Distance between rows
    pub between_row_spacing: f64,
}

/// Integer grid size derived from a [`FieldGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    /// Number of plots in the grid.
    pub fn cells(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }
}

impl FieldGeometry {
    pub fn new(length: f64, width: f64, in_row_spacing: f64, between_row_spacing: f64) -> Self {
        Self {
            length,
            width,
            in_row_spacing,
            between_row_spacing,
        }
    }

    /// Derive rows and columns.
    ///
    /// `rows = round(width / between_row_spacing)` and
    /// `cols = round(length / in_row_spacing)`, rounding half to even.
    /// A zero on either axis is a [`DesignError::DegenerateGrid`]; it is never
    /// clamped up to one.
    pub fn dims(&self) -> Result<GridDims, DesignError> {
        check_positive("length", self.length)?;
        check_positive("width", self.width)?;
        check_positive("in-row spacing", self.in_row_spacing)?;
        check_positive("between-row spacing", self.between_row_spacing)?;

        let rows = round_count("row", self.width / self.between_row_spacing)?;
        let cols = round_count("column", self.length / self.in_row_spacing)?;

        if rows == 0 || cols == 0 {
            return Err(DesignError::DegenerateGrid { rows, cols });
        }

        Ok(GridDims { rows, cols })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), DesignError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::InvalidDimension { field, value })
    }
}

fn round_count(axis: &'static str, ratio: f64) -> Result<usize, DesignError> {
    // Both operands are positive and finite, but the quotient can still overflow.
    if !ratio.is_finite() || ratio > u32::MAX as f64 {
        return Err(DesignError::GridTooLarge { axis, ratio });
    }
    Ok(ratio.round_ties_even() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_field() {
        let dims = FieldGeometry::new(144.0, 42.0, 6.0, 8.0).dims().unwrap();
        assert_eq!(dims, GridDims { rows: 5, cols: 24 });
        assert_eq!(dims.cells(), 120);
    }

    #[test]
    fn test_ties_round_to_even() {
        // 20 / 8 = 2.5 -> 2, 28 / 8 = 3.5 -> 4
        let low = FieldGeometry::new(10.0, 20.0, 10.0, 8.0).dims().unwrap();
        assert_eq!(low.rows, 2);
        let high = FieldGeometry::new(10.0, 28.0, 10.0, 8.0).dims().unwrap();
        assert_eq!(high.rows, 4);
    }

    #[test]
    fn test_non_tie_rounds_to_nearest() {
        // 42 / 8 = 5.25, 46 / 8 = 5.75
        assert_eq!(FieldGeometry::new(6.0, 42.0, 6.0, 8.0).dims().unwrap().rows, 5);
        assert_eq!(FieldGeometry::new(6.0, 46.0, 6.0, 8.0).dims().unwrap().rows, 6);
    }

    #[test]
    fn test_zero_rows_is_degenerate() {
        let err = FieldGeometry::new(144.0, 1.0, 6.0, 8.0).dims().unwrap_err();
        assert_eq!(err, DesignError::DegenerateGrid { rows: 0, cols: 24 });
    }

    #[test]
    fn test_zero_cols_is_degenerate() {
        let err = FieldGeometry::new(2.0, 42.0, 6.0, 8.0).dims().unwrap_err();
        assert_eq!(err, DesignError::DegenerateGrid { rows: 5, cols: 0 });
    }

    #[test]
    fn test_half_rounds_down_to_zero() {
        // 4 / 8 = 0.5 -> 0 under ties-to-even
        let err = FieldGeometry::new(6.0, 4.0, 6.0, 8.0).dims().unwrap_err();
        assert!(matches!(err, DesignError::DegenerateGrid { rows: 0, .. }));
    }

    #[test]
    fn test_rejects_non_positive_and_nan() {
        let cases = [
            FieldGeometry::new(0.0, 42.0, 6.0, 8.0),
            FieldGeometry::new(144.0, -1.0, 6.0, 8.0),
            FieldGeometry::new(144.0, 42.0, f64::NAN, 8.0),
            FieldGeometry::new(144.0, 42.0, 6.0, f64::INFINITY),
        ];
        for geometry in cases {
            assert!(matches!(
                geometry.dims(),
                Err(DesignError::InvalidDimension { .. })
            ));
        }
    }

    #[test]
    fn test_overflowing_ratio_is_rejected() {
        let err = FieldGeometry::new(f64::MAX, 42.0, f64::MIN_POSITIVE, 8.0)
            .dims()
            .unwrap_err();
        assert!(matches!(err, DesignError::GridTooLarge { axis: "column", .. }));
    }
}
