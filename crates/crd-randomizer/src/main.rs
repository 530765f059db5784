//! CRD Field Randomizer CLI.
//!
//! Commands:
//! - run: Randomize from flags and/or a JSON config file
//! - prompt: Ask for each input interactively
//! - show: Preview a previously exported field map
//! - defaults: Print the default configuration as JSON

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crd_kernel::TreatmentSpec;
use crd_randomizer::config::{RandomizerConfig, RunOverrides};
use crd_randomizer::export::read_field_map;
use crd_randomizer::input::{parse_dimension, parse_treatments, ParseError};
use crd_randomizer::preview::{render_preview, render_tally};
use crd_randomizer::prompt::prompt_config;
use crd_randomizer::runner::{run, RunOptions, RunOutcome};

#[derive(Parser)]
#[command(name = "crd-randomizer")]
#[command(version)]
#[command(about = "Completely randomized field layouts from plot geometry and treatment replicates")]
struct Cli {
    /// Enable debug logging (otherwise RUST_LOG, defaulting to info)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Randomize a field and export the map
    Run {
        /// JSON config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Field length (along the rows)
        #[arg(long, value_parser = length_arg)]
        length: Option<f64>,

        /// Field width (across the rows)
        #[arg(long, value_parser = width_arg)]
        width: Option<f64>,

        /// Distance between plots within a row
        #[arg(long = "in-row", value_parser = in_row_arg)]
        in_row_spacing: Option<f64>,

        /// Distance between rows
        #[arg(long = "between-row", value_parser = between_row_arg)]
        between_row_spacing: Option<f64>,

        /// Treatments with replicate counts, e.g. A:40,B:40,C:40
        #[arg(long, value_parser = parse_treatments)]
        treatments: Option<TreatmentSpec>,

        /// Random seed (omit for a fresh one, which is printed; a config file seed is kept)
        #[arg(long, env = "CRD_SEED")]
        seed: Option<u64>,

        /// Output file (.csv, .tsv, .txt or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows to show in the preview
        #[arg(long)]
        preview_rows: Option<usize>,

        /// Append a timestamp to the output file name
        #[arg(long)]
        timestamp: bool,

        /// Also write a JSON run record to this path
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Ask for each input interactively, then randomize
    Prompt {
        /// JSON config file providing the suggested answers
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write a JSON run record to this path
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Preview an exported field map
    Show {
        /// File written by `run` or `prompt`
        file: PathBuf,

        /// Rows to show
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// Print the default configuration as JSON
    Defaults,
}

fn length_arg(text: &str) -> Result<f64, ParseError> {
    parse_dimension("--length", text)
}

fn width_arg(text: &str) -> Result<f64, ParseError> {
    parse_dimension("--width", text)
}

fn in_row_arg(text: &str) -> Result<f64, ParseError> {
    parse_dimension("--in-row", text)
}

fn between_row_arg(text: &str) -> Result<f64, ParseError> {
    parse_dimension("--between-row", text)
}

/// `--verbose` forces debug; otherwise RUST_LOG applies, falling back to info.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RandomizerConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            RandomizerConfig::load(path)
        }
        None => Ok(RandomizerConfig::default()),
    }
}

fn report(outcome: &RunOutcome, preview_rows: usize) {
    println!("Saved to {}\n", outcome.output.display());
    print!("{}", render_preview(&outcome.map, preview_rows));
    println!("\nGrid: {} rows x {} columns", outcome.map.rows(), outcome.map.cols());
    println!("Plots: {}", render_tally(&outcome.map));
    if outcome.seed_drawn {
        println!("Seed: {} (drawn; pass --seed {} to reproduce)", outcome.seed, outcome.seed);
    } else {
        println!("Seed: {}", outcome.seed);
    }
    if let Some(record) = &outcome.record {
        println!("Run id: {}", record.run_id);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    FmtSubscriber::builder()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            config,
            length,
            width,
            in_row_spacing,
            between_row_spacing,
            treatments,
            seed,
            output,
            preview_rows,
            timestamp,
            record,
        } => {
            let mut config = load_config(config.as_ref())?;
            config.apply(RunOverrides {
                length,
                width,
                in_row_spacing,
                between_row_spacing,
                treatments,
                seed,
                output,
                preview_rows,
            });

            let outcome = run(&config, &RunOptions { timestamp, record })?;
            report(&outcome, config.preview_rows);
        }

        Commands::Prompt { config, record } => {
            let defaults = load_config(config.as_ref())?;
            let stdin = io::stdin();
            let config = prompt_config(&mut stdin.lock(), &mut io::stdout(), &defaults)?;

            let outcome = run(
                &config,
                &RunOptions {
                    timestamp: false,
                    record,
                },
            )?;
            report(&outcome, config.preview_rows);
        }

        Commands::Show { file, rows } => {
            let map = read_field_map(&file)?;
            println!("{}: {} rows x {} columns\n", file.display(), map.rows(), map.cols());
            print!("{}", render_preview(&map, rows));
            println!("\nPlots: {}", render_tally(&map));
        }

        Commands::Defaults => {
            let json = serde_json::to_string_pretty(&RandomizerConfig::default())?;
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_flag_value_names_the_flag() {
        for (flag, value, expected) in [
            ("--length", "wide", "--length: `wide` is not a number"),
            ("--width", "0", "--width: 0 must be greater than zero"),
            ("--in-row", "-6", "--in-row: -6 must be greater than zero"),
            ("--between-row", "x", "--between-row: `x` is not a number"),
        ] {
            let arg = format!("{}={}", flag, value);
            let err = Cli::try_parse_from(["crd-randomizer", "run", arg.as_str()])
                .err()
                .unwrap();
            assert!(
                err.to_string().contains(expected),
                "{} {}: {}",
                flag,
                value,
                err
            );
        }
    }

    #[test]
    fn test_run_without_seed_flag_leaves_seed_unset() {
        let cli = Cli::try_parse_from(["crd-randomizer", "run", "-o", "a.csv"]).unwrap();
        let Commands::Run { seed, output, .. } = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(output, Some(PathBuf::from("a.csv")));

        let mut config = RandomizerConfig::default();
        config.apply(RunOverrides {
            seed,
            output,
            ..Default::default()
        });
        if std::env::var_os("CRD_SEED").is_none() {
            assert_eq!(config.seed, None);
        }
    }

    #[test]
    fn test_seed_flag_is_applied() {
        let cli = Cli::try_parse_from(["crd-randomizer", "run", "--seed", "7"]).unwrap();
        let Commands::Run { seed, .. } = cli.command else {
            panic!("expected the run command");
        };
        let mut config = RandomizerConfig::default();
        config.apply(RunOverrides {
            seed,
            ..Default::default()
        });
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_verbose_forces_debug_filter() {
        assert_eq!(log_filter(true).to_string(), "debug");
    }
}
