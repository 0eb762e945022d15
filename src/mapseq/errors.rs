use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting and collapsing barcodes.
#[derive(Error, Debug)]
pub enum BarcodeError {
    /// A single read could not be decoded. Callers skip the read and count it.
    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// Distance requested between barcodes of different lengths. Every barcode
    /// entering the clustering stage has the same window length, so this is an
    /// internal-consistency fault and is never skipped.
    #[error("Barcode length mismatch: '{left}' ({}) vs '{right}' ({})", left.len(), right.len())]
    LengthMismatch { left: String, right: String },

    /// A barcode list entry whose length is not the configured window length.
    #[error("{}: barcode '{barcode}' has length {}, expected {expected}", path.display(), barcode.len())]
    BarcodeLength { path: PathBuf, barcode: String, expected: usize },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FASTQ parse error: {0}")]
    Fastq(#[from] bio::io::fastq::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BarcodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        BarcodeError::MalformedRecord { reason: reason.into() }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        BarcodeError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BarcodeError>;
