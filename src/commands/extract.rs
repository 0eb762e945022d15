use std::path::{Path, PathBuf};
use clap::Parser;
use tracing::{info, warn};

use crate::cli::PipelineArgs;
use crate::mapseq::barcode_file::{barcode_file_for, ensure_distinct_barcode_files, write_barcodes};
use crate::mapseq::config::PipelineConfig;
use crate::mapseq::constants;
use crate::mapseq::errors::Result;
use crate::mapseq::fastq::{extract_files, list_fastq_files, write_read_counts, BatchExtraction};

#[derive(Parser, Debug, Clone)]
pub struct Args {
    // Directory of FASTQ files (plain or gzipped)
    #[arg()]
    pub input_dir: PathBuf,

    // Output directory
    #[arg(long, short, default_value = "./output")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Extracts every FASTQ file in `input_dir`, writing one barcode list per file
/// and the read-count report into `output_dir`.
pub fn extract_dir(input_dir: &Path, output_dir: &Path, config: &PipelineConfig) -> Result<BatchExtraction> {
    let files = list_fastq_files(input_dir)?;
    if files.is_empty() {
        warn!("No FASTQ files found in {}", input_dir.display());
    }
    ensure_distinct_barcode_files(&files, output_dir)?;

    std::fs::create_dir_all(output_dir)?;
    let batch = extract_files(&files, config)?;

    for file in &batch.files {
        let path = barcode_file_for(&file.path, output_dir);
        write_barcodes(&path, &file.barcodes)?;
        info!("Wrote {} barcodes to {}", file.barcodes.len(), path.display());
    }

    let counts = batch.counts();
    write_read_counts(&output_dir.join(constants::READ_COUNTS_FILE), &counts, batch.failed.len())?;
    info!(
        "Extracted {} barcodes from {} reads in {} files",
        counts.accepted,
        counts.total(),
        batch.files.len()
    );

    Ok(batch)
}

pub fn command(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = args.pipeline.load()?;
    extract_dir(&args.input_dir, &args.output_dir, &config)?;
    Ok(())
}
