//! Synthetic MAPseq reads for testing: `barcode + anchor + random tail`, with
//! optional substitution errors in the barcode and constant quality `I`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use bio::io::fastq;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::mapseq::constants;
use crate::mapseq::errors::{BarcodeError, Result};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
const QUALITY_CHAR: u8 = b'I';

#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub molecules: usize,
    pub reads_per_molecule: usize,
    pub barcode_len: usize,
    pub anchor: String,
    pub read_len: usize,
    /// Per-base substitution probability applied to barcode bases.
    pub error_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            molecules: 1000,
            reads_per_molecule: 10,
            barcode_len: constants::DEFAULT_WINDOW_LEN,
            anchor: constants::DEFAULT_ANCHOR.to_string(),
            read_len: 50,
            error_rate: 0.0,
        }
    }
}

impl SimulationParams {
    fn validate(&self) -> Result<()> {
        if self.read_len < self.barcode_len + self.anchor.len() {
            return Err(BarcodeError::configuration(format!(
                "read_len {} cannot hold a {} bp barcode and a {} bp anchor",
                self.read_len,
                self.barcode_len,
                self.anchor.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(BarcodeError::configuration(format!(
                "error_rate must lie in [0, 1] (got {})",
                self.error_rate
            )));
        }
        Ok(())
    }
}

fn random_sequence<R: Rng>(len: usize, rng: &mut R) -> Vec<u8> {
    (0..len).map(|_| BASES[rng.gen_range(0..BASES.len())]).collect()
}

fn with_errors<R: Rng>(barcode: &[u8], error_rate: f64, rng: &mut R) -> Vec<u8> {
    barcode
        .iter()
        .map(|&base| {
            if error_rate > 0.0 && rng.gen_bool(error_rate) {
                let others: Vec<u8> = BASES.iter().copied().filter(|&b| b != base).collect();
                others[rng.gen_range(0..others.len())]
            } else {
                base
            }
        })
        .collect()
}

/// Writes simulated reads and returns the true barcodes, one per molecule.
pub fn simulate<W: Write, R: Rng>(writer: W, params: &SimulationParams, rng: &mut R) -> Result<Vec<String>> {
    params.validate()?;

    let mut wtr = fastq::Writer::new(writer);
    let tail_len = params.read_len - params.barcode_len - params.anchor.len();
    let qual = vec![QUALITY_CHAR; params.read_len];

    let barcodes: Vec<Vec<u8>> = (0..params.molecules)
        .map(|_| random_sequence(params.barcode_len, rng))
        .collect();

    let mut n = 0;
    for barcode in &barcodes {
        for _ in 0..params.reads_per_molecule {
            let mut seq = with_errors(barcode, params.error_rate, rng);
            seq.extend_from_slice(params.anchor.as_bytes());
            seq.extend(random_sequence(tail_len, rng));
            wtr.write(&format!("seq{}", n), None, &seq, &qual)?;
            n += 1;
        }
    }
    wtr.flush()?;

    Ok(barcodes
        .into_iter()
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .collect())
}

/// Simulates into a file, gzip-compressed when the path ends in `.gz`.
pub fn simulate_file(path: &Path, params: &SimulationParams, seed: u64) -> Result<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let file = BufWriter::new(File::create(path)?);

    let barcodes = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        let barcodes = simulate(&mut encoder, params, &mut rng)?;
        encoder.finish()?.flush()?;
        barcodes
    } else {
        simulate(file, params, &mut rng)?
    };

    info!(
        "Wrote {} reads for {} molecules to {}",
        params.molecules * params.reads_per_molecule,
        params.molecules,
        path.display()
    );
    Ok(barcodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_reads_have_expected_layout() {
        let params = SimulationParams { molecules: 3, reads_per_molecule: 2, ..Default::default() };
        let mut out = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        let barcodes = simulate(&mut out, &params, &mut rng).unwrap();
        assert_eq!(barcodes.len(), 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3 * 2 * 4);
        assert_eq!(lines[0], "@seq0");
        assert_eq!(lines[1].len(), 50);
        assert!(lines[1].starts_with(&barcodes[0]));
        assert_eq!(&lines[1][30..49], constants::DEFAULT_ANCHOR);
        assert_eq!(lines[3], "I".repeat(50));
        assert!(lines[5].starts_with(&barcodes[0]));
        assert!(lines[9].starts_with(&barcodes[1]));
    }

    #[test]
    fn test_same_seed_same_output() {
        let params = SimulationParams { molecules: 5, reads_per_molecule: 3, error_rate: 0.1, ..Default::default() };
        let (mut a, mut b) = (Vec::new(), Vec::new());
        simulate(&mut a, &params, &mut StdRng::seed_from_u64(1)).unwrap();
        simulate(&mut b, &params, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_errors_are_substitutions() {
        let mut rng = StdRng::seed_from_u64(3);
        let barcode = b"ACGTACGTACGTACGTACGT";
        let mutated = with_errors(barcode, 1.0, &mut rng);
        assert_eq!(mutated.len(), barcode.len());
        assert!(mutated.iter().zip(barcode).all(|(a, b)| a != b));
        assert_eq!(with_errors(barcode, 0.0, &mut rng), barcode.to_vec());
    }

    #[test]
    fn test_invalid_params() {
        let params = SimulationParams { read_len: 20, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(simulate(Vec::new(), &params, &mut rng).is_err());

        let params = SimulationParams { error_rate: 1.5, ..Default::default() };
        assert!(simulate(Vec::new(), &params, &mut rng).is_err());
    }
}
