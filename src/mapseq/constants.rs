// Constants for MAPseq barcode extraction and collapsing
//
// Anchor
pub const DEFAULT_ANCHOR: &str = "GTACTGCGGCCGCTACCTA";

// Barcode window
pub const DEFAULT_WINDOW_LEN: usize = 30;

// Quality thresholds
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 30.0;
pub const PHRED_OFFSET: u8 = 33;
pub const MAX_PHRED_CHAR: u8 = b'~';

// Clustering
pub const DEFAULT_MAX_DISTANCE: usize = 1;

// Reading
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const FASTQ_EXTENSIONS: [&str; 4] = [".fastq", ".fq", ".fastq.gz", ".fq.gz"];
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// Outputs
pub const BARCODE_FILE_SUFFIX: &str = "_barcodes.txt";
pub const TRUE_BARCODES_FILE: &str = "true_barcodes.txt";
pub const READ_COUNTS_FILE: &str = "read_counts.csv";

// Valid nucleotide symbols, including the unknown base
pub const NUCLEOTIDES: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];
