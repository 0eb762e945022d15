//! Per-read barcode extraction anchored on a fixed motif.
//!
//! The barcode is the `window_len` bases immediately upstream of the first
//! occurrence of the anchor. A read yields at most one barcode, and only when
//! the mean quality over the window reaches the configured threshold.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::mapseq::config::PipelineConfig;
use crate::mapseq::read::{mean_quality, Read};

/// Why a well-formed read produced no barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AnchorNotFound,
    AnchorTooClose,
    LowQuality,
}

/// Every way a read can leave the extractor, used for the read-count report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Outcome {
    #[strum(serialize = "Accepted")]
    Accepted,
    #[strum(serialize = "Anchor Not Found")]
    AnchorNotFound,
    #[strum(serialize = "Anchor Too Close To Read Start")]
    AnchorTooClose,
    #[strum(serialize = "Low Quality")]
    LowQuality,
    #[strum(serialize = "Malformed Record")]
    Malformed,
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::AnchorNotFound => Outcome::AnchorNotFound,
            Rejection::AnchorTooClose => Outcome::AnchorTooClose,
            Rejection::LowQuality => Outcome::LowQuality,
        }
    }
}

/// Tallies of read outcomes. Merging is associative and commutative, so
/// per-worker tallies can be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionCounts {
    pub accepted: u64,
    pub anchor_not_found: u64,
    pub anchor_too_close: u64,
    pub low_quality: u64,
    pub malformed: u64,
}

impl ExtractionCounts {
    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Accepted => self.accepted,
            Outcome::AnchorNotFound => self.anchor_not_found,
            Outcome::AnchorTooClose => self.anchor_too_close,
            Outcome::LowQuality => self.low_quality,
            Outcome::Malformed => self.malformed,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut u64 {
        match outcome {
            Outcome::Accepted => &mut self.accepted,
            Outcome::AnchorNotFound => &mut self.anchor_not_found,
            Outcome::AnchorTooClose => &mut self.anchor_too_close,
            Outcome::LowQuality => &mut self.low_quality,
            Outcome::Malformed => &mut self.malformed,
        }
    }

    pub fn total(&self) -> u64 {
        Outcome::iter().map(|outcome| self.get(outcome)).sum()
    }

    pub fn merge(mut self, other: ExtractionCounts) -> ExtractionCounts {
        for outcome in Outcome::iter() {
            *self.slot(outcome) += other.get(outcome);
        }
        self
    }

    /// Rows of the read-count report, in a fixed order.
    pub fn rows(&self) -> Vec<(Outcome, u64)> {
        Outcome::iter().map(|outcome| (outcome, self.get(outcome))).collect()
    }
}

/// Extracts the barcode from one read, or explains why there is none.
pub fn inspect(read: &Read, config: &PipelineConfig) -> Result<String, Rejection> {
    let anchor_start = read
        .sequence()
        .find(config.anchor.as_str())
        .ok_or(Rejection::AnchorNotFound)?;

    if anchor_start < config.window_len {
        return Err(Rejection::AnchorTooClose);
    }

    let window = (anchor_start - config.window_len)..anchor_start;
    if mean_quality(&read.qualities()[window.clone()]) < config.quality_threshold {
        return Err(Rejection::LowQuality);
    }

    Ok(read.sequence()[window].to_string())
}

pub fn extract(read: &Read, config: &PipelineConfig) -> Option<String> {
    inspect(read, config).ok()
}
