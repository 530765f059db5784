//! The randomization pipeline.
//!
//! derive dims -> check replicates -> expand plots -> seeded shuffle ->
//! row-major grid. Validation is all-or-nothing and happens before any
//! random draws.

use serde::{Deserialize, Serialize};

use crate::error::RandomizeError;
use crate::field_map::FieldMap;
use crate::geometry::FieldGeometry;
use crate::permutation::permute;
use crate::treatment::TreatmentSpec;

/// Assign every treatment replicate to exactly one plot of the field.
///
/// Returns the labeled grid, or the first design error found. Nothing is
/// built when validation fails.
pub fn randomize(
    geometry: &FieldGeometry,
    treatments: &TreatmentSpec,
    seed: u64,
) -> Result<FieldMap, RandomizeError> {
    let dims = geometry.dims()?;
    treatments.check_fits(dims)?;

    let plots = permute(treatments.plot_sequence(), seed);
    Ok(FieldMap::from_row_major(plots, dims)?)
}

/// All inputs of one randomization, in a form callers can store and replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomizeRequest {
    pub geometry: FieldGeometry,
    pub treatments: TreatmentSpec,
    pub seed: u64,
}

impl RandomizeRequest {
    pub fn run(&self) -> Result<FieldMap, RandomizeError> {
        randomize(&self.geometry, &self.treatments, self.seed)
    }
}
