//! CRD Kernel: completely randomized designs for rectangular field plots.
//!
//! Given the physical size of a field, the plot spacing and a list of
//! treatments with replicate counts, this crate derives the plot grid,
//! checks that the replicates fill it exactly, and assigns treatments to
//! plots with a seeded, unbiased shuffle.
//!
//! The kernel is pure: no I/O, no logging, no global generator state. Each
//! call builds its own generator from its own seed.

pub mod engine;
pub mod error;
pub mod field_map;
pub mod geometry;
pub mod permutation;
pub mod treatment;

pub use engine::{randomize, RandomizeRequest};
pub use error::{DesignError, LayoutError, RandomizeError, TreatmentError};
pub use field_map::FieldMap;
pub use geometry::{FieldGeometry, GridDims};
pub use treatment::{Treatment, TreatmentCode, TreatmentSpec};
