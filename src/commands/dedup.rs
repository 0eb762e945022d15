use std::path::{Path, PathBuf};
use clap::Parser;
use tracing::info;

use crate::cli::PipelineArgs;
use crate::mapseq::barcode_file::{check_barcode_lengths, read_barcodes, write_barcodes};
use crate::mapseq::cluster::{deduplicate, BarcodeCounts};
use crate::mapseq::errors::Result;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    // Barcode lists, one barcode per line
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    // Canonical barcode output
    #[arg(long, short, default_value = "true_barcodes.txt")]
    pub output: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Collapses `counts` and writes one canonical barcode per line.
pub fn write_canonical(counts: &BarcodeCounts, max_distance: usize, output: &Path) -> Result<Vec<String>> {
    let canonical = deduplicate(counts, max_distance)?;
    write_barcodes(output, &canonical)?;
    info!("Wrote {} canonical barcodes to {}", canonical.len(), output.display());
    Ok(canonical)
}

pub fn command(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = args.pipeline.load()?;

    let mut counts = BarcodeCounts::new();
    for path in &args.inputs {
        let barcodes = read_barcodes(path)?;
        check_barcode_lengths(path, &barcodes, config.window_len)?;
        info!("Loaded {} barcodes from {}", barcodes.len(), path.display());
        counts.extend(barcodes);
    }

    write_canonical(&counts, config.max_distance, &args.output)?;
    Ok(())
}
