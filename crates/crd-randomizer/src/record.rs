//! Run records: what was randomized, with which seed, and where it went.
//!
//! A record holds everything needed to regenerate the same field map, so it
//! can be kept next to the exported file as an audit trail.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use crd_kernel::{FieldMap, GridDims, RandomizeRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plot count for one treatment in the produced map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub code: String,
    pub plots: usize,
}

/// Record of a single randomization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique id for this run
    pub run_id: Uuid,
    /// When the map was produced
    pub created_at: DateTime<Utc>,
    /// Inputs, including the seed actually used
    pub request: RandomizeRequest,
    /// Derived grid size
    pub dims: GridDims,
    /// Plots per treatment in the produced map
    pub tally: Vec<TallyEntry>,
    /// Exported file, if one was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl RunRecord {
    pub fn new(request: RandomizeRequest, map: &FieldMap, output: Option<PathBuf>) -> Self {
        let tally = map
            .tally()
            .into_iter()
            .map(|(code, plots)| TallyEntry {
                code: code.into(),
                plots,
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            request,
            dims: map.dims(),
            tally,
            output,
        }
    }

    /// Regenerate the field map from the recorded inputs.
    pub fn replay(&self) -> Result<FieldMap> {
        Ok(self.request.run()?)
    }

    /// Save the record to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&json)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crd_kernel::{FieldGeometry, TreatmentSpec};

    use super::*;

    fn request() -> RandomizeRequest {
        RandomizeRequest {
            geometry: FieldGeometry::new(12.0, 16.0, 6.0, 8.0),
            treatments: TreatmentSpec::new([("T1", 3), ("T2", 1)]).unwrap(),
            seed: 5,
        }
    }

    #[test]
    fn test_record_captures_run() {
        let request = request();
        let map = request.run().unwrap();
        let record = RunRecord::new(request.clone(), &map, None);

        assert_eq!(record.dims, GridDims { rows: 2, cols: 2 });
        let total: usize = record.tally.iter().map(|t| t.plots).sum();
        assert_eq!(total, 4);
        assert!(record.tally.contains(&TallyEntry {
            code: "T1".to_string(),
            plots: 3
        }));
        assert_eq!(record.replay().unwrap(), map);
    }

    #[test]
    fn test_output_omitted_when_absent() {
        let request = request();
        let map = request.run().unwrap();
        let json = serde_json::to_value(RunRecord::new(request, &map, None)).unwrap();
        assert!(json.get("output").is_none());
        assert_eq!(json["request"]["seed"], 5);
    }
}
