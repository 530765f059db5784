//! Run configuration.
//!
//! Loaded from JSON at runtime; command-line flags override individual
//! fields. Defaults describe a 144 x 42 inch bench with three treatments.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crd_kernel::{FieldGeometry, RandomizeRequest, TreatmentSpec};
use serde::{Deserialize, Serialize};

/// Top-level randomizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizerConfig {
    /// Field length along the rows
    pub length: f64,

    /// Field width across the rows
    pub width: f64,

    /// Plot spacing within a row
    pub in_row_spacing: f64,

    /// Spacing between rows
    pub between_row_spacing: f64,

    /// Treatments in layout order, each with its replicate count
    pub treatments: TreatmentSpec,

    /// Random seed. When absent a fresh one is drawn and reported
    pub seed: Option<u64>,

    /// Where to write the field map; the extension picks the format
    pub output: PathBuf,

    /// Rows shown in the terminal preview
    pub preview_rows: usize,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        Self {
            length: 144.0,
            width: 42.0,
            in_row_spacing: 6.0,
            between_row_spacing: 8.0,
            treatments: default_treatments(),
            seed: None,
            output: PathBuf::from("field_map.csv"),
            preview_rows: 5,
        }
    }
}

// Distinct non-empty literal codes with positive counts always validate.
fn default_treatments() -> TreatmentSpec {
    TreatmentSpec::new([("A", 40), ("B", 40), ("C", 40)])
        .expect("A/B/C x 40 is a valid treatment list")
}

/// Per-run values given on the command line. `None` leaves the config alone.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub in_row_spacing: Option<f64>,
    pub between_row_spacing: Option<f64>,
    pub treatments: Option<TreatmentSpec>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub preview_rows: Option<usize>,
}

impl RandomizerConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn geometry(&self) -> FieldGeometry {
        FieldGeometry::new(
            self.length,
            self.width,
            self.in_row_spacing,
            self.between_row_spacing,
        )
    }

    /// Replace every field the overrides set.
    ///
    /// An omitted seed keeps the configured one, which is unset by default,
    /// so a plain run draws a fresh seed.
    pub fn apply(&mut self, overrides: RunOverrides) {
        if let Some(length) = overrides.length {
            self.length = length;
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(spacing) = overrides.in_row_spacing {
            self.in_row_spacing = spacing;
        }
        if let Some(spacing) = overrides.between_row_spacing {
            self.between_row_spacing = spacing;
        }
        if let Some(treatments) = overrides.treatments {
            self.treatments = treatments;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(rows) = overrides.preview_rows {
            self.preview_rows = rows;
        }
    }

    /// Kernel request for this configuration, using `seed` for the shuffle.
    pub fn request(&self, seed: u64) -> RandomizeRequest {
        RandomizeRequest {
            geometry: self.geometry(),
            treatments: self.treatments.clone(),
            seed,
        }
    }
}
