use std::path::PathBuf;
use clap::Parser;

use crate::cli::PipelineArgs;
use crate::mapseq::barcode_file::write_barcodes;
use crate::mapseq::simulate::{simulate_file, SimulationParams};

#[derive(Parser, Debug, Clone)]
pub struct Args {
    // FASTQ output, gzipped when it ends in .gz
    #[arg(long, short)]
    pub output: PathBuf,

    // Also write the true barcodes here
    #[arg(long)]
    pub truth: Option<PathBuf>,

    #[arg(long, default_value = "1000")]
    pub molecules: usize,
    #[arg(long, default_value = "10")]
    pub reads_per_molecule: usize,
    #[arg(long, default_value = "50")]
    pub read_len: usize,
    #[arg(long, default_value = "0.0")]
    pub error_rate: f64,
    #[arg(long, default_value = "42")]
    pub seed: u64,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn command(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.pipeline.load()?;

    let params = SimulationParams {
        molecules: args.molecules,
        reads_per_molecule: args.reads_per_molecule,
        barcode_len: config.window_len,
        anchor: config.anchor,
        read_len: args.read_len,
        error_rate: args.error_rate,
    };
    let barcodes = simulate_file(&args.output, &params, args.seed)?;

    if let Some(truth) = &args.truth {
        write_barcodes(truth, &barcodes)?;
    }

    Ok(())
}
