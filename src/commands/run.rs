use std::path::PathBuf;
use clap::Parser;

use crate::cli::PipelineArgs;
use crate::commands::dedup::write_canonical;
use crate::commands::extract::extract_dir;
use crate::mapseq::constants;

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

pub fn command(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.pipeline.load()?;

    // clustering needs every file's barcodes, so extraction finishes first
    let batch = extract_dir(&args.input_dir, &args.output_dir, &config)?;
    let output = args.output_dir.join(constants::TRUE_BARCODES_FILE);
    write_canonical(&batch.barcode_counts(), config.max_distance, &output)?;

    Ok(())
}
