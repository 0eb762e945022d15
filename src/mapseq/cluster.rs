//! Error-tolerant barcode collapsing using graph-based clustering
//!
//! Sequencing errors turn one true barcode into a family of near-identical
//! variants. This module collapses each family back into a single canonical
//! barcode.
//!
//! # Algorithm
//! 1. Count the observed barcodes; nodes are the *distinct* barcodes, each
//!    carrying its observation count
//! 2. Link two nodes when their Hamming distance is at most `max_distance`
//! 3. Merge linked nodes with a union-find structure; each connected
//!    component is one cluster
//! 4. Pick the most frequently observed member of each cluster as its
//!    canonical barcode (ties go to the lexicographically smallest)
//!
//! # Performance
//! - For `max_distance == 1` edges are found by probing every single-base
//!   substitution of each barcode against a hash index: O(n * L * |alphabet|)
//!   instead of O(n²)
//! - Larger distances fall back to a pairwise scan with early exit
//! - Edge discovery runs on the rayon pool; merging is sequential and
//!   iterative, so very large clusters cannot overflow the stack
//!
//! # Example
//! ```
//! use mapseq_barcodes::mapseq::cluster::{deduplicate, BarcodeCounts};
//!
//! let mut counts = BarcodeCounts::new();
//! counts.add_count("AAAA", 100);
//! counts.add_count("AAAT", 3);
//! counts.add_count("TTTT", 50);
//! counts.add_count("TTTA", 1);
//!
//! let canonical = deduplicate(&counts, 1).unwrap();
//! assert_eq!(canonical, vec!["AAAA".to_string(), "TTTT".to_string()]);
//! ```

use std::collections::{BTreeSet, HashMap};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::mapseq::distance::within_distance;
use crate::mapseq::errors::{BarcodeError, Result};

/// Distinct barcodes with their observation counts, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct BarcodeCounts {
    barcodes: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, usize>,
    total: u64,
}

impl BarcodeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, barcode: &str) {
        self.add_count(barcode, 1);
    }

    pub fn add_count(&mut self, barcode: &str, count: u64) {
        self.total += count;
        match self.index.get(barcode) {
            Some(&i) => self.counts[i] += count,
            None => {
                self.index.insert(barcode.to_string(), self.barcodes.len());
                self.barcodes.push(barcode.to_string());
                self.counts.push(count);
            }
        }
    }

    /// Number of distinct barcodes.
    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    /// Number of observations, duplicates included.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, barcode: &str) -> u64 {
        self.index.get(barcode).map_or(0, |&i| self.counts[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.barcodes.iter().map(String::as_str).zip(self.counts.iter().copied())
    }

    fn barcode(&self, i: usize) -> &str {
        &self.barcodes[i]
    }

    fn position(&self, barcode: &[u8]) -> Option<usize> {
        let barcode = std::str::from_utf8(barcode).ok()?;
        self.index.get(barcode).copied()
    }
}

impl<S: AsRef<str>> Extend<S> for BarcodeCounts {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for barcode in iter {
            self.add(barcode.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for BarcodeCounts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counts = BarcodeCounts::new();
        counts.extend(iter);
        counts
    }
}

/// Union-find over node indices with union by size and path halving.
#[derive(Debug)]
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        DisjointSets { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
        true
    }
}

/// A connected set of distinct barcodes believed to come from one molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    members: Vec<String>,
}

impl Cluster {
    /// Members in first-seen order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, barcode: &str) -> bool {
        self.members.iter().any(|m| m == barcode)
    }
}

fn check_uniform_length(counts: &BarcodeCounts) -> Result<()> {
    let Some(first) = counts.barcodes.first() else {
        return Ok(());
    };
    match counts.barcodes.iter().find(|b| b.len() != first.len()) {
        Some(other) => Err(BarcodeError::LengthMismatch {
            left: first.clone(),
            right: other.clone(),
        }),
        None => Ok(()),
    }
}

/// Edges between barcodes one substitution apart, found by hashing every
/// single-base variant of each barcode.
fn substitution_edges(counts: &BarcodeCounts) -> Vec<(usize, usize)> {
    let alphabet: Vec<u8> = counts
        .barcodes
        .iter()
        .flat_map(|b| b.bytes())
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .collect();

    (0..counts.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let mut probe = counts.barcode(i).as_bytes().to_vec();
            let mut found = Vec::new();
            for pos in 0..probe.len() {
                let original = probe[pos];
                for &symbol in alphabet.iter().filter(|&&s| s != original) {
                    probe[pos] = symbol;
                    if let Some(j) = counts.position(&probe) {
                        // each pair is reported once, from its lower index
                        if j > i {
                            found.push((i, j));
                        }
                    }
                }
                probe[pos] = original;
            }
            found
        })
        .collect()
}

fn pairwise_edges(counts: &BarcodeCounts, max_distance: usize) -> Vec<(usize, usize)> {
    let n = counts.len();
    (0..n)
        .into_par_iter()
        .flat_map_iter(move |i| {
            let a = counts.barcode(i).as_bytes();
            ((i + 1)..n)
                .filter(move |&j| within_distance(a, counts.barcode(j).as_bytes(), max_distance))
                .map(move |j| (i, j))
        })
        .collect()
}

/// Partitions the distinct barcodes into connected components of the
/// "Hamming distance <= max_distance" relation.
///
/// Clusters are ordered by their earliest-seen member. Every distinct barcode
/// appears in exactly one cluster; barcodes with no neighbours form singleton
/// clusters. Fails with `LengthMismatch` if barcode lengths differ.
pub fn cluster(counts: &BarcodeCounts, max_distance: usize) -> Result<Vec<Cluster>> {
    if counts.is_empty() {
        return Ok(Vec::new());
    }
    check_uniform_length(counts)?;

    let edges = match max_distance {
        0 => Vec::new(),
        1 => substitution_edges(counts),
        _ => pairwise_edges(counts, max_distance),
    };
    debug!("Found {} edges among {} distinct barcodes", edges.len(), counts.len());

    let mut sets = DisjointSets::new(counts.len());
    for (a, b) in edges {
        sets.union(a, b);
    }

    let mut cluster_of_root: HashMap<usize, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for i in 0..counts.len() {
        let root = sets.find(i);
        let slot = *cluster_of_root.entry(root).or_insert_with(|| {
            clusters.push(Cluster { members: Vec::new() });
            clusters.len() - 1
        });
        clusters[slot].members.push(counts.barcode(i).to_string());
    }

    Ok(clusters)
}

/// Picks one canonical barcode per cluster: the member observed most often,
/// ties broken by the lexicographically smallest barcode.
pub fn consolidate(clusters: &[Cluster], counts: &BarcodeCounts) -> Vec<String> {
    clusters
        .iter()
        .filter_map(|cluster| {
            cluster
                .members
                .iter()
                .max_by(|a, b| counts.count(a).cmp(&counts.count(b)).then_with(|| b.cmp(a)))
                .cloned()
        })
        .collect()
}

/// Clusters and consolidates in one pass.
pub fn deduplicate(counts: &BarcodeCounts, max_distance: usize) -> Result<Vec<String>> {
    let clusters = cluster(counts, max_distance)?;

    let largest = clusters.iter().map(Cluster::len).max().unwrap_or(0);
    let singletons = clusters.iter().filter(|c| c.len() == 1).count();
    info!(
        "Collapsed {} observations ({} distinct) into {} clusters (largest {}, {} singletons)",
        counts.total(),
        counts.len(),
        clusters.len(),
        largest,
        singletons
    );

    Ok(consolidate(&clusters, counts))
}
