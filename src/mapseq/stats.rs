//! Summary statistics and format checks for extracted barcode lists.

use std::fmt;
use std::sync::LazyLock;
use regex::Regex;

use crate::mapseq::cluster::BarcodeCounts;

static VALID_BARCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ACGT]+$").expect("barcode pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeSummary {
    pub total: usize,
    pub unique: usize,
    /// Most frequent barcodes, highest count first.
    pub top: Vec<(String, u64)>,
    /// Barcodes of the wrong length or with symbols outside A, C, G, T.
    pub invalid: usize,
}

pub fn summarize<S: AsRef<str>>(barcodes: &[S], expected_len: usize, top_n: usize) -> BarcodeSummary {
    let counts: BarcodeCounts = barcodes.iter().collect();
    let mut top: Vec<(String, u64)> = counts.iter().map(|(b, n)| (b.to_string(), n)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(top_n);

    let invalid = barcodes
        .iter()
        .filter(|b| {
            let b: &str = (*b).as_ref();
            b.len() != expected_len || !VALID_BARCODE.is_match(b)
        })
        .count();

    BarcodeSummary { total: barcodes.len(), unique: counts.len(), top, invalid }
}

impl fmt::Display for BarcodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of barcodes: {}", self.total)?;
        writeln!(f, "Number of unique barcodes: {}", self.unique)?;
        writeln!(f, "Top {} most frequent barcodes:", self.top.len())?;
        for (barcode, count) in &self.top {
            writeln!(f, "{}: {}", barcode, count)?;
        }
        if self.invalid == 0 {
            write!(f, "All barcodes have the correct length and format.")
        } else {
            write!(f, "{} barcodes have incorrect length or format.", self.invalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let barcodes = ["ACGT", "ACGT", "TTTT", "GGGG", "ACGT", "GGGG"];
        let summary = summarize(&barcodes, 4, 2);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.unique, 3);
        assert_eq!(summary.top, vec![("ACGT".to_string(), 3), ("GGGG".to_string(), 2)]);
        assert_eq!(summary.invalid, 0);
    }

    #[test]
    fn test_invalid_barcodes() {
        let barcodes = ["ACGT", "ACG", "ACNT", "acgt", "ACGTA"];
        let summary = summarize(&barcodes, 4, 10);
        assert_eq!(summary.invalid, 4);
        assert!(summary.to_string().ends_with("4 barcodes have incorrect length or format."));
    }

    #[test]
    fn test_top_ties_sorted_by_barcode() {
        let barcodes = ["TTTT", "AAAA", "CCCC"];
        let summary = summarize(&barcodes, 4, 2);
        assert_eq!(summary.top, vec![("AAAA".to_string(), 1), ("CCCC".to_string(), 1)]);
    }

    #[test]
    fn test_repeated_calls_share_pattern() {
        let barcodes = ["ACGT", "ACGN"];
        let first = summarize(&barcodes, 4, 1);
        let second = summarize(&barcodes, 4, 1);
        assert_eq!(first, second);
        assert_eq!(first.invalid, 1);
    }

    #[test]
    fn test_empty_list() {
        let barcodes: [&str; 0] = [];
        let summary = summarize(&barcodes, 30, 10);
        assert_eq!(summary.total, 0);
        assert!(summary.top.is_empty());
        assert!(summary.to_string().contains("All barcodes have the correct length and format."));
    }
}
