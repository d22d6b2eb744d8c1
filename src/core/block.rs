//! Block segmentation of a partition
//!
//! A partition is sorted by right end and cut wherever two consecutive right
//! ends are more than `max_separation` apart. Each resulting run of at least
//! two records is one block; chains never cross a block boundary, which keeps
//! the quadratic relaxation bounded on chromosome-scale partitions.

use crate::core::Record;
use std::ops::Range;

/// Default maximum gap between successive sorted right ends within a block
pub const DEFAULT_MAX_SEPARATION: i64 = 50_000;

/// Why a partition produced no blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than two records
    TooFewRecords,
    /// Lead record has no consensus coordinates
    UnresolvedConsensus,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewRecords => write!(f, "too few records"),
            SkipReason::UnresolvedConsensus => write!(f, "unresolved consensus"),
        }
    }
}

/// Sorted records of one partition with their block boundaries
#[derive(Debug)]
pub struct Blocks<'a> {
    sorted: Vec<&'a Record>,
    bounds: Vec<Range<usize>>,
    splits: usize,
}

impl<'a> Blocks<'a> {
    /// Blocks in ascending genomic order
    pub fn iter(&self) -> impl Iterator<Item = &[&'a Record]> + '_ {
        self.bounds.iter().map(move |r| &self.sorted[r.clone()])
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Number of separation gaps found
    pub fn splits(&self) -> usize {
        self.splits
    }
}

/// Outcome of segmenting a partition
#[derive(Debug)]
pub enum Segmentation<'a> {
    Skip(SkipReason),
    Blocks(Blocks<'a>),
}

/// Sort a partition by `(chrom, right)` and split it into blocks.
///
/// The sort is stable, so records with equal right ends keep arrival order.
pub fn segment(records: &[Record], max_separation: i64) -> Segmentation<'_> {
    if records.len() < 2 {
        return Segmentation::Skip(SkipReason::TooFewRecords);
    }

    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.genomic
            .chrom
            .cmp(&b.genomic.chrom)
            .then(a.genomic.right.cmp(&b.genomic.right))
    });

    if sorted[0].consensus_left.is_none() {
        return Segmentation::Skip(SkipReason::UnresolvedConsensus);
    }

    let n = sorted.len();
    let mut bounds = Vec::new();
    let mut splits = 0;
    let mut start = 0;
    for i in 1..=n {
        let cut = i == n || sorted[i].genomic.right - sorted[i - 1].genomic.right > max_separation;
        if !cut {
            continue;
        }
        if i < n {
            splits += 1;
        }
        if i - start >= 2 {
            bounds.push(start..i);
        }
        start = i;
    }

    Segmentation::Blocks(Blocks {
        sorted,
        bounds,
        splits,
    })
}
