use bio::io::fastq;

use crate::mapseq::constants;
use crate::mapseq::errors::{BarcodeError, Result};

/// A sequenced read with per-base quality scores already decoded from ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    sequence: String,
    qualities: Vec<u8>,
}

impl Read {
    pub fn new(sequence: impl Into<String>, qualities: Vec<u8>) -> Result<Self> {
        let sequence = sequence.into();
        if sequence.len() != qualities.len() {
            return Err(BarcodeError::malformed(format!(
                "sequence length {} differs from quality length {}",
                sequence.len(),
                qualities.len()
            )));
        }
        if !sequence.is_ascii() {
            return Err(BarcodeError::malformed("sequence contains non-ASCII symbols"));
        }
        Ok(Read { sequence, qualities })
    }

    /// Decodes a FASTQ record, rejecting it when sequence and quality lengths
    /// differ or a quality character falls outside the printable Phred range.
    pub fn from_fastq(record: &fastq::Record, phred_offset: u8) -> Result<Self> {
        if record.seq().len() != record.qual().len() {
            return Err(BarcodeError::malformed(format!(
                "record '{}': sequence length {} differs from quality length {}",
                record.id(),
                record.seq().len(),
                record.qual().len()
            )));
        }

        let sequence = std::str::from_utf8(record.seq())
            .map_err(|_| BarcodeError::malformed(format!("record '{}': non-UTF-8 sequence", record.id())))?;

        let qualities = record
            .qual()
            .iter()
            .map(|&q| {
                if q < phred_offset || q > constants::MAX_PHRED_CHAR {
                    Err(BarcodeError::malformed(format!(
                        "record '{}': quality character {:?} outside encoding range",
                        record.id(),
                        q as char
                    )))
                } else {
                    Ok(q - phred_offset)
                }
            })
            .collect::<Result<Vec<u8>>>()?;

        Read::new(sequence, qualities)
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn qualities(&self) -> &[u8] {
        &self.qualities
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Arithmetic mean of a slice of quality scores; 0 for an empty slice.
pub fn mean_quality(qualities: &[u8]) -> f64 {
    if qualities.is_empty() {
        return 0.0;
    }
    qualities.iter().map(|&q| q as u64).sum::<u64>() as f64 / qualities.len() as f64
}
