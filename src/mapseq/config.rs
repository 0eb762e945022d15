//! Immutable run configuration, layered from defaults, an optional settings
//! file, `MAPSEQ_*` environment variables and command-line overrides.

use std::path::Path;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use dotenvy::dotenv;
use tracing::debug;

use crate::mapseq::constants;
use crate::mapseq::errors::{BarcodeError, Result};

pub const ENV_PREFIX: &str = "MAPSEQ";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Literal motif located in every read; the barcode sits right before it.
    pub anchor: String,
    /// Number of bases taken immediately upstream of the anchor.
    pub window_len: usize,
    /// Minimum mean Phred quality over the window.
    pub quality_threshold: f64,
    /// Maximum Hamming distance linking two barcodes in the same cluster.
    pub max_distance: usize,
    /// Extraction workers; 0 uses one per available core.
    pub threads: usize,
    pub phred_offset: u8,
    pub chunk_size: usize,
    /// Shortest read the run is expected to contain, if known.
    pub min_read_len: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            anchor: constants::DEFAULT_ANCHOR.to_string(),
            window_len: constants::DEFAULT_WINDOW_LEN,
            quality_threshold: constants::DEFAULT_QUALITY_THRESHOLD,
            max_distance: constants::DEFAULT_MAX_DISTANCE,
            threads: 0,
            phred_offset: constants::PHRED_OFFSET,
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
            min_read_len: None,
        }
    }
}

/// Values given on the command line. Integers stay signed so that negative
/// input reaches validation instead of failing inside the argument parser.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub anchor: Option<String>,
    pub window_len: Option<i64>,
    pub quality_threshold: Option<f64>,
    pub max_distance: Option<i64>,
    pub threads: Option<i64>,
    pub chunk_size: Option<i64>,
    pub min_read_len: Option<i64>,
}

pub fn load_settings(config_file: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    dotenv().ok();

    let mut builder = ConfigBuilder::<DefaultState>::default()
        .set_default("anchor", constants::DEFAULT_ANCHOR)?
        .set_default("window_len", constants::DEFAULT_WINDOW_LEN as i64)?
        .set_default("quality_threshold", constants::DEFAULT_QUALITY_THRESHOLD)?
        .set_default("max_distance", constants::DEFAULT_MAX_DISTANCE as i64)?
        .set_default("threads", 0i64)?
        .set_default("phred_offset", constants::PHRED_OFFSET as i64)?
        .set_default("chunk_size", constants::DEFAULT_CHUNK_SIZE as i64)?;

    if let Some(path) = config_file {
        debug!("Reading settings from {}", path.display());
        builder = builder.add_source(File::from(path));
    }

    let settings = builder
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .set_override_option("anchor", overrides.anchor.clone())?
        .set_override_option("window_len", overrides.window_len)?
        .set_override_option("quality_threshold", overrides.quality_threshold)?
        .set_override_option("max_distance", overrides.max_distance)?
        .set_override_option("threads", overrides.threads)?
        .set_override_option("chunk_size", overrides.chunk_size)?
        .set_override_option("min_read_len", overrides.min_read_len)?
        .build()?;

    Ok(settings)
}

fn non_negative(settings: &Config, key: &str) -> Result<usize> {
    let value = settings.get_int(key)?;
    usize::try_from(value).map_err(|_| {
        BarcodeError::configuration(format!("{} must not be negative (got {})", key, value))
    })
}

impl PipelineConfig {
    /// Loads and validates the layered settings in one step.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let settings = load_settings(config_file, overrides)?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Config) -> Result<Self> {
        let phred_offset = settings.get_int("phred_offset")?;
        let phred_offset = u8::try_from(phred_offset)
            .ok()
            .filter(|offset| *offset <= constants::MAX_PHRED_CHAR)
            .ok_or_else(|| {
                BarcodeError::configuration(format!("phred_offset out of range: {}", phred_offset))
            })?;

        let min_read_len = match settings.get_int("min_read_len") {
            Ok(_) => Some(non_negative(settings, "min_read_len")?),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let config = PipelineConfig {
            anchor: settings.get_string("anchor")?,
            window_len: non_negative(settings, "window_len")?,
            quality_threshold: settings.get_float("quality_threshold")?,
            max_distance: non_negative(settings, "max_distance")?,
            threads: non_negative(settings, "threads")?,
            phred_offset,
            chunk_size: non_negative(settings, "chunk_size")?,
            min_read_len,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every read fail, before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.anchor.is_empty() {
            return Err(BarcodeError::configuration("anchor motif must not be empty"));
        }
        if let Some(symbol) = self.anchor.bytes().find(|b| !constants::NUCLEOTIDES.contains(b)) {
            return Err(BarcodeError::configuration(format!(
                "anchor motif '{}' contains non-nucleotide symbol '{}'",
                self.anchor, symbol as char
            )));
        }
        if self.window_len == 0 {
            return Err(BarcodeError::configuration("window_len must be positive"));
        }
        if !self.quality_threshold.is_finite() || self.quality_threshold < 0.0 {
            return Err(BarcodeError::configuration(format!(
                "quality_threshold must be a non-negative number (got {})",
                self.quality_threshold
            )));
        }
        if self.chunk_size == 0 {
            return Err(BarcodeError::configuration("chunk_size must be positive"));
        }
        if self.phred_offset > constants::MAX_PHRED_CHAR {
            return Err(BarcodeError::configuration(format!(
                "phred_offset out of range: {}",
                self.phred_offset
            )));
        }
        if let Some(min_read_len) = self.min_read_len {
            if self.anchor.len() > min_read_len {
                return Err(BarcodeError::configuration(format!(
                    "anchor motif ({} bp) is longer than the minimum read length ({} bp)",
                    self.anchor.len(),
                    min_read_len
                )));
            }
        }
        Ok(())
    }
}
