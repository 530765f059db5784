//! Treatment codes and the ordered code -> replicate-count list.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DesignError, TreatmentError};
use crate::geometry::GridDims;

/// A short, non-empty label for one treatment (e.g. `"A"`, `"N120"`).
///
/// Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreatmentCode(String);

impl TreatmentCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, TreatmentError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(TreatmentError::EmptyCode);
        }
        if code.chars().any(char::is_control) {
            return Err(TreatmentError::ControlCharacter {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TreatmentCode {
    type Error = TreatmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TreatmentCode> for String {
    fn from(code: TreatmentCode) -> Self {
        code.0
    }
}

impl AsRef<str> for TreatmentCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreatmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One treatment and how many plots it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub code: TreatmentCode,
    pub replicates: u32,
}

/// Ordered treatment list with unique codes and positive replicate counts.
///
/// Iteration order is insertion order, so the pre-shuffle plot sequence is
/// the same for the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Treatment>", into = "Vec<Treatment>")]
pub struct TreatmentSpec {
    entries: Vec<Treatment>,
}

impl TreatmentSpec {
    /// Build a list from `(code, replicates)` pairs.
    ///
    /// Fails on the first empty code, duplicate code, or zero count. An
    /// empty list is rejected too.
    pub fn new<I, C>(pairs: I) -> Result<Self, TreatmentError>
    where
        I: IntoIterator<Item = (C, u32)>,
        C: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(code, replicates)| -> Result<Treatment, TreatmentError> {
                Ok(Treatment {
                    code: TreatmentCode::new(code)?,
                    replicates,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<Treatment>) -> Result<Self, TreatmentError> {
        if entries.is_empty() {
            return Err(TreatmentError::NoTreatments);
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.replicates == 0 {
                return Err(TreatmentError::ZeroReplicates {
                    code: entry.code.to_string(),
                });
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(TreatmentError::DuplicateCode {
                    code: entry.code.to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Treatment> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replicate count for `code`, if present.
    pub fn replicates(&self, code: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|t| t.code.as_str() == code)
            .map(|t| t.replicates)
    }

    /// Sum of all replicate counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|t| u64::from(t.replicates)).sum()
    }

    /// Fail with [`DesignError::DesignMismatch`] unless the replicates fill
    /// `dims` exactly.
    pub fn check_fits(&self, dims: GridDims) -> Result<(), DesignError> {
        let total = self.total();
        if total != dims.cells() {
            return Err(DesignError::DesignMismatch {
                rows: dims.rows,
                cols: dims.cols,
                total,
            });
        }
        Ok(())
    }

    /// Each code repeated by its replicate count, in list order.
    pub fn plot_sequence(&self) -> Vec<TreatmentCode> {
        let mut plots = Vec::with_capacity(self.total() as usize);
        for entry in &self.entries {
            plots.extend(std::iter::repeat_n(
                entry.code.clone(),
                entry.replicates as usize,
            ));
        }
        plots
    }
}

impl TryFrom<Vec<Treatment>> for TreatmentSpec {
    type Error = TreatmentError;

    fn try_from(entries: Vec<Treatment>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<TreatmentSpec> for Vec<Treatment> {
    fn from(spec: TreatmentSpec) -> Self {
        spec.entries
    }
}

impl<'a> IntoIterator for &'a TreatmentSpec {
    type Item = &'a Treatment;
    type IntoIter = std::slice::Iter<'a, Treatment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for TreatmentSpec {
    /// Renders in the `A:40,B:40` form accepted by the command line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", entry.code, entry.replicates)?;
        }
        Ok(())
    }
}
