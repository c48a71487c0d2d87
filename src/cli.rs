//! Command-line front end.
//!
//! Reads a JSON dataset (`{"column": [values...]}`), runs one query or one
//! privatization and renders the result as JSON.
//!
//! Usage:
//!   dpshield query --input data.json --column age --operation mean
//!   dpshield privatize --input data.json --columns age,city --output out.json

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::adapters::noise_source;
use crate::application::{
    compare_columns, ColumnComparison, ColumnPrivatizer, PrivatizeRequest, QueryRequest, QueryService, Scope,
};
use crate::config::DpConfig;
use crate::domain::Dataset;
use crate::ports::{NoiseSource, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "dpshield")]
#[command(version)]
#[command(about = "Differentially private queries and column release over JSON datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Random source: secure or statistical (DPSHIELD_NOISE_SOURCE when absent)
    #[arg(long, global = true)]
    pub noise: Option<SourceKind>,

    /// Fixed seed for reproducible runs. Removes every privacy guarantee.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer one aggregate query with noise
    Query {
        /// Dataset file
        #[arg(short, long)]
        input: PathBuf,

        /// Column to query
        #[arg(short, long)]
        column: String,

        /// mean, sum, count, histogram or full_column
        #[arg(long)]
        operation: String,

        /// laplace, gaussian or exponential
        #[arg(short, long, default_value = "laplace")]
        mechanism: String,

        #[arg(short, long)]
        epsilon: Option<f64>,

        #[arg(short, long)]
        delta: Option<f64>,

        /// Sensitivity override (observed range when absent)
        #[arg(long)]
        sensitivity: Option<f64>,
    },

    /// Privatize columns value by value
    Privatize {
        /// Dataset file
        #[arg(short, long)]
        input: PathBuf,

        /// Columns to privatize (first column when neither this nor --whole-file is given)
        #[arg(long, value_delimiter = ',', conflicts_with = "whole_file")]
        columns: Vec<String>,

        /// Privatize every column
        #[arg(long)]
        whole_file: bool,

        /// laplace, gaussian or exponential
        #[arg(short, long, default_value = "laplace")]
        mechanism: String,

        #[arg(short, long)]
        epsilon: Option<f64>,

        #[arg(short, long)]
        delta: Option<f64>,

        /// Per-value sensitivity for numeric columns
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Write the privatized dataset here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include original-vs-privatized summaries per processed column
        #[arg(long)]
        compare: bool,
    },
}

#[derive(Serialize)]
struct ColumnReport {
    column: String,
    #[serde(flatten)]
    comparison: ColumnComparison,
}

#[derive(Serialize)]
struct PrivatizeReport<'a> {
    columns_processed: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dataset: Option<&'a Dataset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    comparisons: Vec<ColumnReport>,
}

fn read_dataset(path: &Path) -> Result<Dataset> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Dataset::from_json_str(&raw).with_context(|| format!("Invalid dataset in {}", path.display()))
}

/// Run the parsed command and render its JSON output.
///
/// # Errors
/// Returns error if the input cannot be read or parsed, the request is
/// invalid, or the output file cannot be written.
pub fn execute(cli: Cli, config: &DpConfig) -> Result<String> {
    let kind = cli.noise.unwrap_or(config.noise_source);
    let noise: Arc<dyn NoiseSource> = Arc::from(noise_source(kind, cli.seed));
    tracing::debug!(noise = %kind, seeded = cli.seed.is_some(), "noise source ready");

    match cli.command {
        Command::Query {
            input,
            column,
            operation,
            mechanism,
            epsilon,
            delta,
            sensitivity,
        } => {
            let dataset = read_dataset(&input)?;
            let request = QueryRequest {
                operation,
                mechanism,
                epsilon,
                delta,
                sensitivity,
            };
            let result = QueryService::with_config(noise, config).run_on_dataset(&dataset, &column, &request)?;
            Ok(serde_json::to_string_pretty(&result)?)
        }
        Command::Privatize {
            input,
            columns,
            whole_file,
            mechanism,
            epsilon,
            delta,
            sensitivity,
            output,
            compare,
        } => {
            let dataset = read_dataset(&input)?;
            let scope = if whole_file {
                Scope::WholeFile
            } else {
                Scope::Columns(columns)
            };
            let request = PrivatizeRequest {
                mechanism,
                epsilon,
                delta,
                sensitivity,
                scope,
            };
            let result = ColumnPrivatizer::with_config(noise, config).privatize_dataset(&dataset, &request)?;

            if let Some(path) = &output {
                let json = serde_json::to_string_pretty(&result.dataset)?;
                std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "wrote privatized dataset");
            }

            let comparisons = if compare {
                result
                    .columns_processed
                    .iter()
                    .filter_map(|name| Some((dataset.column(name)?, result.dataset.column(name)?)))
                    .map(|(before, after)| ColumnReport {
                        column: before.name().to_string(),
                        comparison: compare_columns(before, after),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            let report = PrivatizeReport {
                columns_processed: &result.columns_processed,
                output: output.as_deref(),
                dataset: output.is_none().then_some(&result.dataset),
                comparisons,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}
