//! This module reads FASTQ files and extracts one barcode per qualifying read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use bio::io::fastq;
use bio::io::fastq::FastqRead;
use csv::Writer;
use flate2::read::MultiGzDecoder;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info, warn};

use crate::mapseq::cluster::BarcodeCounts;
use crate::mapseq::config::PipelineConfig;
use crate::mapseq::constants;
use crate::mapseq::errors::{BarcodeError, Result};
use crate::mapseq::extract::{inspect, ExtractionCounts, Outcome};
use crate::mapseq::read::Read;

pub type FastqReader = fastq::Reader<BufReader<Box<dyn std::io::Read + Send>>>;

/// Barcodes accepted from one input file, in read order.
#[derive(Debug, Clone)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub barcodes: Vec<String>,
    pub counts: ExtractionCounts,
}

/// Per-file results of one extraction batch, in input order. Files that
/// could not be read are listed in `failed` and contribute nothing else.
#[derive(Debug, Clone, Default)]
pub struct BatchExtraction {
    pub files: Vec<FileExtraction>,
    pub failed: Vec<PathBuf>,
}

impl BatchExtraction {
    pub fn counts(&self) -> ExtractionCounts {
        self.files
            .iter()
            .fold(ExtractionCounts::default(), |acc, file| acc.merge(file.counts))
    }

    /// Every accepted barcode of the batch, files concatenated.
    pub fn barcodes(&self) -> impl Iterator<Item = &str> {
        self.files.iter().flat_map(|file| file.barcodes.iter().map(String::as_str))
    }

    pub fn barcode_counts(&self) -> BarcodeCounts {
        self.barcodes().collect()
    }
}

/// Opens a FASTQ file, transparently decompressing gzip input. Compression is
/// detected from the file's magic bytes, not its extension.
pub fn open_fastq(path: &Path) -> Result<FastqReader> {
    let file = File::open(path)?;
    let mut buffered = BufReader::new(file);
    let is_gzip = buffered.fill_buf()?.starts_with(&constants::GZIP_MAGIC);

    let inner: Box<dyn std::io::Read + Send> = if is_gzip {
        Box::new(MultiGzDecoder::new(buffered))
    } else {
        Box::new(buffered)
    };
    Ok(fastq::Reader::new(inner))
}

/// FASTQ files (plain or gzipped) directly inside `dir`, sorted by name.
pub fn list_fastq_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && constants::FASTQ_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn process_record(record: &fastq::Record, config: &PipelineConfig) -> (Outcome, Option<String>) {
    match Read::from_fastq(record, config.phred_offset) {
        Err(e) => {
            debug!("Skipping read: {}", e);
            (Outcome::Malformed, None)
        }
        Ok(read) => match inspect(&read, config) {
            Ok(barcode) => (Outcome::Accepted, Some(barcode)),
            Err(rejection) => (rejection.into(), None),
        },
    }
}

fn process_chunk(
    chunk: &[fastq::Record],
    config: &PipelineConfig,
    barcodes: &mut Vec<String>,
    counts: &mut ExtractionCounts,
) {
    let outcomes: Vec<(Outcome, Option<String>)> = chunk
        .par_iter()
        .map(|record| process_record(record, config))
        .collect();

    for (outcome, barcode) in outcomes {
        counts.record(outcome);
        barcodes.extend(barcode);
    }
}

/// Extracts barcodes from an open reader. Records are pulled in chunks of
/// `chunk_size`; each chunk is processed in parallel and its results appended
/// in read order.
///
/// A record missing its quality line is counted as malformed and reading
/// resumes at the next line. Any other parse error ends the file.
pub fn extract_reader<B: BufRead>(
    mut reader: fastq::Reader<B>,
    config: &PipelineConfig,
) -> Result<(Vec<String>, ExtractionCounts)> {
    let mut barcodes = Vec::new();
    let mut counts = ExtractionCounts::default();
    let mut chunk: Vec<fastq::Record> = Vec::with_capacity(config.chunk_size);
    let mut n = 0;

    loop {
        let mut record = fastq::Record::new();
        match reader.read(&mut record) {
            Ok(()) if record.is_empty() => break,
            Ok(()) => chunk.push(record),
            Err(fastq::Error::IncompleteRecord) => {
                debug!("Skipping incomplete record '{}'", record.id());
                counts.record(Outcome::Malformed);
                n += 1;
            }
            Err(e) => return Err(e.into()),
        }

        if chunk.len() == config.chunk_size {
            process_chunk(&chunk, config, &mut barcodes, &mut counts);
            n += chunk.len();
            chunk.clear();
            debug!("Processed {} reads", n);
        }
    }

    process_chunk(&chunk, config, &mut barcodes, &mut counts);

    Ok((barcodes, counts))
}

pub fn extract_file(path: &Path, config: &PipelineConfig) -> Result<FileExtraction> {
    info!("Processing FASTQ file: {}", path.display());

    let reader = open_fastq(path)?;
    let (barcodes, counts) = extract_reader(reader, config)?;

    if counts.malformed > 0 {
        warn!("{}: skipped {} malformed records", path.display(), counts.malformed);
    }
    info!(
        "{}: {} of {} reads yielded a barcode",
        path.display(),
        counts.accepted,
        counts.total()
    );

    Ok(FileExtraction { path: path.to_path_buf(), barcodes, counts })
}

pub fn build_pool(config: &PipelineConfig) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| BarcodeError::configuration(format!("failed to build thread pool: {}", e)))
}

/// Extracts every file on a worker pool of `config.threads` threads. Each file
/// is handled independently and the per-file results are merged afterwards.
/// A file that fails to open or parse is logged and recorded as failed; the
/// other files' results are kept.
pub fn extract_files(paths: &[PathBuf], config: &PipelineConfig) -> Result<BatchExtraction> {
    config.validate()?;
    let pool = build_pool(config)?;

    let results: Vec<(PathBuf, Result<FileExtraction>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), extract_file(path, config)))
            .collect()
    });

    let mut batch = BatchExtraction::default();
    for (path, result) in results {
        match result {
            Ok(file) => batch.files.push(file),
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                batch.failed.push(path);
            }
        }
    }

    if !batch.failed.is_empty() {
        warn!("{} of {} files could not be read", batch.failed.len(), paths.len());
    }
    Ok(batch)
}

/// Writes the read-outcome report as a two-column CSV.
pub fn write_read_counts(path: &Path, counts: &ExtractionCounts, failed_files: usize) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(&["Outcome", "Count"])?;
    for (outcome, count) in counts.rows() {
        wtr.write_record(&[outcome.to_string(), count.to_string()])?;
    }
    wtr.write_record(&["Total Reads", &counts.total().to_string()])?;
    wtr.write_record(&["Failed Files", &failed_files.to_string()])?;
    wtr.flush()?;
    Ok(())
}
