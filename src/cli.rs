use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::commands;
use crate::mapseq::config::{Overrides, PipelineConfig};
use crate::mapseq::errors::Result;

/// Settings shared by every command. Each flag overrides the config file and
/// the `MAPSEQ_*` environment.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Settings file (TOML, YAML, JSON, ...)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Anchor motif located in every read
    #[arg(long)]
    pub anchor: Option<String>,

    /// Number of bases taken right before the anchor
    #[arg(long, allow_negative_numbers = true)]
    pub window_len: Option<i64>,

    /// Minimum mean Phred quality over the barcode window
    #[arg(long, allow_negative_numbers = true)]
    pub quality_threshold: Option<f64>,

    /// Maximum Hamming distance between barcodes of one cluster
    #[arg(long, allow_negative_numbers = true)]
    pub max_distance: Option<i64>,

    /// Extraction workers (0 = one per core)
    #[arg(long, short, allow_negative_numbers = true)]
    pub threads: Option<i64>,
}

impl PipelineArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            anchor: self.anchor.clone(),
            window_len: self.window_len,
            quality_threshold: self.quality_threshold,
            max_distance: self.max_distance,
            threads: self.threads,
            ..Default::default()
        }
    }

    pub fn load(&self) -> Result<PipelineConfig> {
        PipelineConfig::load(self.config.as_deref(), &self.overrides())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract per-file barcode lists from a directory of FASTQ files
    Extract(commands::extract::Args),
    /// Collapse barcode lists into one canonical barcode per cluster
    Dedup(commands::dedup::Args),
    /// Extract, then collapse, in one pass
    Run(commands::run::Args),
    /// Report statistics for the barcode lists in a directory
    Stats(commands::stats::Args),
    /// Write a synthetic FASTQ file with known barcodes
    Simulate(commands::simulate::Args),
}

#[derive(Parser)]
#[command(
    name = "mapseq-barcodes",
    color = clap::ColorChoice::Auto,
    version,
    about = "Extract and deduplicate MAPseq barcodes from FASTQ reads",
)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
