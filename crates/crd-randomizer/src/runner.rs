//! One end-to-end randomization: resolve the seed, build the map, export it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use crd_kernel::FieldMap;
use rand::Rng;
use tracing::{debug, info};

use crate::config::RandomizerConfig;
use crate::export::{timestamped_path, write_field_map, ExportFormat};
use crate::record::RunRecord;

/// Output options that are not part of the randomization itself.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Insert a timestamp into the output file name
    pub timestamp: bool,
    /// Also write a JSON run record here
    pub record: Option<PathBuf>,
}

/// Everything a caller needs to report a finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub map: FieldMap,
    pub seed: u64,
    /// True when no seed was configured and one was drawn for this run
    pub seed_drawn: bool,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub record: Option<RunRecord>,
}

/// Seed from the config, or a fresh one from the thread generator.
pub fn resolve_seed(configured: Option<u64>) -> (u64, bool) {
    match configured {
        Some(seed) => (seed, false),
        None => (rand::rng().random(), true),
    }
}

/// Randomize `config` and write the result.
///
/// The output format is checked before randomizing, and nothing is written
/// unless the map was built.
pub fn run(config: &RandomizerConfig, options: &RunOptions) -> Result<RunOutcome> {
    let output = if options.timestamp {
        timestamped_path(&config.output)
    } else {
        config.output.clone()
    };
    ExportFormat::from_path(&output)?;

    let (seed, seed_drawn) = resolve_seed(config.seed);
    if seed_drawn {
        info!(seed, "No seed configured, drew a fresh one");
    }

    let request = config.request(seed);
    if let Ok(dims) = request.geometry.dims() {
        debug!(
            rows = dims.rows,
            cols = dims.cols,
            treatments = %request.treatments,
            "Derived field grid"
        );
    }

    let map = request.run()?;
    info!(rows = map.rows(), cols = map.cols(), seed, "Randomized field map");

    let format = write_field_map(&map, &output)?;
    info!(path = %output.display(), format = format.name(), "Saved field map");

    let record = match &options.record {
        Some(path) => {
            let record = RunRecord::new(request, &map, Some(output.clone()));
            record
                .save(path)
                .with_context(|| format!("writing run record {}", path.display()))?;
            info!(path = %path.display(), run_id = %record.run_id, "Saved run record");
            Some(record)
        }
        None => None,
    };

    Ok(RunOutcome {
        map,
        seed,
        seed_drawn,
        output,
        format,
        record,
    })
}
