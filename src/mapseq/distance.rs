use crate::mapseq::errors::{BarcodeError, Result};

/// Counts positions at which two equal-length barcodes differ.
pub fn hamming_distance(a: &str, b: &str) -> Result<usize> {
    if a.len() != b.len() {
        return Err(BarcodeError::LengthMismatch {
            left: a.to_string(),
            right: b.to_string(),
        });
    }
    Ok(a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count())
}

/// Whether two equal-length byte strings differ in at most `max_distance`
/// positions. Stops at the first mismatch past the bound.
#[inline(always)]
pub(crate) fn within_distance(a: &[u8], b: &[u8], max_distance: usize) -> bool {
    debug_assert_eq!(a.len(), b.len(), "barcodes must be same length");

    let mut mismatches = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            mismatches += 1;
            if mismatches > max_distance {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_identical() {
        assert_eq!(hamming_distance("ACGTACGT", "ACGTACGT").unwrap(), 0);
        assert_eq!(hamming_distance("", "").unwrap(), 0);
    }

    #[test]
    fn test_hamming_counts_mismatches() {
        assert_eq!(hamming_distance("AAAA", "AAAT").unwrap(), 1);
        assert_eq!(hamming_distance("AAAA", "TTTT").unwrap(), 4);
        assert_eq!(hamming_distance("ACGN", "ACGT").unwrap(), 1);
    }

    #[test]
    fn test_hamming_symmetric() {
        let pairs = [("ACGT", "TGCA"), ("AAAA", "AATA"), ("GATTACA", "GATTTCA")];
        for (a, b) in pairs {
            assert_eq!(hamming_distance(a, b).unwrap(), hamming_distance(b, a).unwrap());
        }
    }

    #[test]
    fn test_hamming_length_mismatch() {
        let err = hamming_distance("ACGT", "ACG").unwrap_err();
        assert!(matches!(err, BarcodeError::LengthMismatch { .. }));
    }

    #[test]
    fn test_within_distance() {
        assert!(within_distance(b"ATCGATCG", b"ATCGATCG", 0));
        assert!(within_distance(b"ATCGATCG", b"TTCGATCG", 1));
        assert!(!within_distance(b"ATCGATCG", b"TTCGATCT", 1));
        assert!(within_distance(b"ATCGATCG", b"TTCGATCT", 2));
        assert!(!within_distance(b"AAAA", b"TTTT", 3));
    }
}
