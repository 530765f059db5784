//! Interactive prompt mode.
//!
//! Asks for each input in turn, showing the current value in brackets; a
//! blank answer keeps it. For the seed, blank keeps a configured seed and
//! otherwise draws a fresh one; `fresh` always draws. The first unparseable
//! answer aborts the session.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::config::RandomizerConfig;
use crate::input::{parse_dimension, parse_seed, parse_treatments};

/// Seed answer that discards any configured seed.
const FRESH_SEED: &str = "fresh";

/// Run the prompt sequence over `input`/`output`, starting from `defaults`.
pub fn prompt_config<R, W>(input: &mut R, output: &mut W, defaults: &RandomizerConfig) -> Result<RandomizerConfig>
where
    R: BufRead,
    W: Write,
{
    let mut config = defaults.clone();

    writeln!(output, "Welcome to the CRD Field Randomizer!")?;

    if let Some(answer) = ask(input, output, "Field length", &config.length.to_string())? {
        config.length = parse_dimension("field length", &answer)?;
    }
    if let Some(answer) = ask(input, output, "Field width", &config.width.to_string())? {
        config.width = parse_dimension("field width", &answer)?;
    }
    if let Some(answer) = ask(input, output, "In-row spacing", &config.in_row_spacing.to_string())? {
        config.in_row_spacing = parse_dimension("in-row spacing", &answer)?;
    }
    if let Some(answer) = ask(
        input,
        output,
        "Between-row spacing",
        &config.between_row_spacing.to_string(),
    )? {
        config.between_row_spacing = parse_dimension("between-row spacing", &answer)?;
    }
    if let Some(answer) = ask(
        input,
        output,
        "Treatments (e.g. A:40,B:40,C:40)",
        &config.treatments.to_string(),
    )? {
        config.treatments = parse_treatments(&answer)?;
    }

    let (seed_question, seed_default) = match config.seed {
        Some(seed) => ("Random seed ('fresh' for a new one)", seed.to_string()),
        None => ("Random seed (blank for a fresh one)", FRESH_SEED.to_string()),
    };
    if let Some(answer) = ask(input, output, seed_question, &seed_default)? {
        config.seed = if answer.eq_ignore_ascii_case(FRESH_SEED) {
            None
        } else {
            Some(parse_seed(&answer)?)
        };
    }

    let output_default = config.output.display().to_string();
    if let Some(answer) = ask(input, output, "Output file", &output_default)? {
        config.output = PathBuf::from(answer);
    }

    Ok(config)
}

/// Print one question and read one answer. `None` means keep the default.
fn ask<R, W>(input: &mut R, output: &mut W, question: &str, default: &str) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} [{}]: ", question, default)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input ended before `{}` was answered", question);
    }

    let answer = line.trim();
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_string()))
    }
}
