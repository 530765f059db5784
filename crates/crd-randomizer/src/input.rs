//! Text input parsing for field dimensions, treatments and seeds.
//!
//! Everything that reaches the kernel has already been through here, so a
//! malformed value is reported as a [`ParseError`] before any grid work.

use crd_kernel::{TreatmentError, TreatmentSpec};
use thiserror::Error;

/// Malformed user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{field}: `{text}` is not a number")]
    InvalidNumber { field: &'static str, text: String },

    #[error("{field}: {text} must be greater than zero")]
    NotPositive { field: &'static str, text: String },

    #[error("treatment entry `{entry}` is not of the form CODE:COUNT")]
    MalformedPair { entry: String },

    #[error("treatment `{code}`: replicate count `{text}` is not a whole number")]
    InvalidCount { code: String, text: String },

    #[error("seed `{text}` is not a non-negative integer")]
    InvalidSeed { text: String },

    #[error(transparent)]
    Treatments(#[from] TreatmentError),
}

/// Parse a positive, finite field dimension or spacing.
pub fn parse_dimension(field: &'static str, text: &str) -> Result<f64, ParseError> {
    let text = text.trim();
    let value: f64 = text.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        text: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParseError::InvalidNumber {
            field,
            text: text.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ParseError::NotPositive {
            field,
            text: text.to_string(),
        });
    }
    Ok(value)
}

/// Parse a treatment list such as `A:40,B:40,C:40`.
///
/// Whitespace around codes and counts is ignored, as are empty entries (a
/// trailing comma). Duplicate codes are an error, never a silent overwrite.
pub fn parse_treatments(text: &str) -> Result<TreatmentSpec, ParseError> {
    let mut pairs = Vec::new();

    for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, count) = entry
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedPair {
                entry: entry.to_string(),
            })?;
        let (code, count) = (code.trim(), count.trim());
        if count.contains(':') {
            return Err(ParseError::MalformedPair {
                entry: entry.to_string(),
            });
        }
        let replicates: u32 = count.parse().map_err(|_| ParseError::InvalidCount {
            code: code.to_string(),
            text: count.to_string(),
        })?;
        pairs.push((code, replicates));
    }

    Ok(TreatmentSpec::new(pairs)?)
}

/// Parse a random seed.
pub fn parse_seed(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    text.parse().map_err(|_| ParseError::InvalidSeed {
        text: text.to_string(),
    })
}
