//! CRD Randomizer: the command-line side of the field randomizer.
//!
//! This crate collects inputs (flags, a JSON config file, or an interactive
//! prompt), hands them to `crd_kernel`, and writes the resulting field map:
//! - CSV / TSV / JSON export and re-import
//! - Terminal preview of the first rows
//! - JSON run records for reproducing a layout later

pub mod config;
pub mod export;
pub mod input;
pub mod preview;
pub mod prompt;
pub mod record;
pub mod runner;

pub use config::{RandomizerConfig, RunOverrides};
pub use export::{read_field_map, write_field_map, ExportError, ExportFormat};
pub use input::ParseError;
pub use record::RunRecord;
pub use runner::{run, RunOptions, RunOutcome};
