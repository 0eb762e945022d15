pub mod barcode_file;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod distance;
pub mod errors;
pub mod extract;
pub mod fastq;
pub mod read;
pub mod simulate;
pub mod stats;
