use std::path::PathBuf;
use clap::Parser;
use tracing::warn;

use crate::cli::PipelineArgs;
use crate::mapseq::barcode_file::{list_barcode_files, read_barcodes};
use crate::mapseq::stats::summarize;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    // Directory holding *_barcodes.txt files
    #[arg()]
    pub dir: PathBuf,

    // Number of most frequent barcodes to show
    #[arg(long, default_value = "10")]
    pub top: usize,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn command(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.pipeline.load()?;

    let files = list_barcode_files(&args.dir)?;
    if files.is_empty() {
        warn!("No barcode files found in {}", args.dir.display());
    }

    for path in files {
        let barcodes = read_barcodes(&path)?;
        let summary = summarize(&barcodes, config.window_len, args.top);
        println!("File: {}", path.display());
        println!("{}", summary);
        println!();
    }

    Ok(())
}
