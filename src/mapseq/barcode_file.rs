use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::mapseq::constants;
use crate::mapseq::errors::{BarcodeError, Result};

/// Writes one barcode per line, without a header.
pub fn write_barcodes<S: AsRef<str>>(path: &Path, barcodes: &[S]) -> Result<()> {
    let mut wtr = BufWriter::new(File::create(path)?);
    for barcode in barcodes {
        writeln!(wtr, "{}", barcode.as_ref())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a barcode list, trimming whitespace and skipping blank lines.
pub fn read_barcodes(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut barcodes = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let barcode = line.trim();
        if !barcode.is_empty() {
            barcodes.push(barcode.to_string());
        }
    }
    Ok(barcodes)
}

/// Output path of the barcode list for an input FASTQ: the file name up to its
/// first `.`, followed by `_barcodes.txt`.
pub fn barcode_file_for(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = name.split('.').next().unwrap_or(name);
    output_dir.join(format!("{}{}", stem, constants::BARCODE_FILE_SUFFIX))
}

/// Fails when two inputs share a stem (`a.fastq` and `a.fq.gz`) and would
/// write the same barcode list.
pub fn ensure_distinct_barcode_files(inputs: &[PathBuf], output_dir: &Path) -> Result<()> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let output = barcode_file_for(input, output_dir);
        if let Some(previous) = seen.insert(output.clone(), input) {
            return Err(BarcodeError::configuration(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                output.display()
            )));
        }
    }
    Ok(())
}

/// Rejects a loaded list containing a barcode of any length other than
/// `expected_len`.
pub fn check_barcode_lengths(path: &Path, barcodes: &[String], expected_len: usize) -> Result<()> {
    match barcodes.iter().find(|b| b.len() != expected_len) {
        Some(barcode) => Err(BarcodeError::BarcodeLength {
            path: path.to_path_buf(),
            barcode: barcode.clone(),
            expected: expected_len,
        }),
        None => Ok(()),
    }
}

/// Per-file barcode lists directly inside `dir`, sorted by name. The
/// collapsed `true_barcodes.txt` is not one of them.
pub fn list_barcode_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_barcode_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| {
                n.ends_with(constants::BARCODE_FILE_SUFFIX) && n != constants::TRUE_BARCODES_FILE
            });
        if path.is_file() && is_barcode_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_barcodes.txt");
        write_barcodes(&path, &["ACGT", "TTTT", "ACGT"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ACGT\nTTTT\nACGT\n");
        assert_eq!(read_barcodes(&path).unwrap(), vec!["ACGT", "TTTT", "ACGT"]);
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "ACGT\r\n\n  TTTT  \n").unwrap();
        assert_eq!(read_barcodes(&path).unwrap(), vec!["ACGT", "TTTT"]);
    }

    #[test]
    fn test_barcode_file_for() {
        let out = Path::new("/out");
        assert_eq!(
            barcode_file_for(Path::new("/data/SRR123.fastq.gz"), out),
            PathBuf::from("/out/SRR123_barcodes.txt")
        );
        assert_eq!(
            barcode_file_for(Path::new("run.fq"), out),
            PathBuf::from("/out/run_barcodes.txt")
        );
    }

    #[test]
    fn test_shared_stem_rejected() {
        let out = Path::new("/out");
        let inputs = vec![PathBuf::from("/in/a.fastq"), PathBuf::from("/in/b.fastq")];
        assert!(ensure_distinct_barcode_files(&inputs, out).is_ok());

        let inputs = vec![PathBuf::from("/in/a.fastq"), PathBuf::from("/in/a.fq.gz")];
        let err = ensure_distinct_barcode_files(&inputs, out).unwrap_err();
        assert!(matches!(err, BarcodeError::Configuration(_)));
        assert!(err.to_string().contains("a_barcodes.txt"));
    }

    #[test]
    fn test_barcode_lengths_checked() {
        let path = Path::new("x_barcodes.txt");
        let barcodes = vec!["ACGT".to_string(), "TTTT".to_string()];
        assert!(check_barcode_lengths(path, &barcodes, 4).is_ok());

        let err = check_barcode_lengths(path, &barcodes, 5).unwrap_err();
        assert!(matches!(err, BarcodeError::BarcodeLength { expected: 5, .. }));

        let mixed = vec!["ACGT".to_string(), "ACG".to_string()];
        assert!(check_barcode_lengths(path, &mixed, 4).is_err());
    }

    #[test]
    fn test_list_barcode_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_barcodes.txt", "a_barcodes.txt", "true_barcodes.txt", "reads.fastq"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let files = list_barcode_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a_barcodes.txt"), dir.path().join("b_barcodes.txt")]);
    }
}
