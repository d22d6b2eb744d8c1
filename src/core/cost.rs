//! Link cost between ordered repeat records
//!
//! The geometric model compares how far two fragments overlap (or are
//! separated) in the genome with how far they overlap on the repeat
//! consensus. Concordant adjacency is cheap; discordant overlap is
//! expensive. A large cost only makes a link unattractive; the only hard
//! refusals are an unknown strand and exceeding the span limit.

use crate::core::{Record, Strand};

/// Default hard span limit between sorted right ends (bases)
pub const DEFAULT_MAX_SPAN: i64 = 100_000;

/// Width exponent of the genomic overlap trough
pub const GENOMIC_TOLERANCE: f64 = 2.0;
/// Width exponent of the consensus overlap trough
pub const CONSENSUS_TOLERANCE: f64 = 1.0;
/// Width exponent of the concordance trough
pub const CONCORDANCE_TOLERANCE: f64 = 0.5;

/// Position used for consensus coordinates the masker left unresolved
const UNRESOLVED_CONSENSUS: i64 = -1;

/// Scores a link from `left` to `right`, where `right` ends at or after `left`.
///
/// Returns `None` when the link is not permitted. Because blocks are sorted by
/// right end, the chain optimizer treats `None` as "no record further left can
/// link either" and stops scanning.
pub trait CostModel {
    fn link(&self, left: &Record, right: &Record) -> Option<f64>;
}

impl<F> CostModel for F
where
    F: Fn(&Record, &Record) -> Option<f64>,
{
    fn link(&self, left: &Record, right: &Record) -> Option<f64> {
        self(left, right)
    }
}

/// The geometric trough cost model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricCost {
    pub max_span: i64,
}

impl Default for GeometricCost {
    fn default() -> Self {
        Self {
            max_span: DEFAULT_MAX_SPAN,
        }
    }
}

impl GeometricCost {
    pub fn new(max_span: i64) -> Self {
        Self { max_span }
    }
}

impl CostModel for GeometricCost {
    fn link(&self, left: &Record, right: &Record) -> Option<f64> {
        if !right.genomic.strand.is_known()
            || right.genomic.right - left.genomic.right > self.max_span
        {
            return None;
        }

        let g_overlap = left.genomic.right - right.genomic.left;
        let r_overlap = consensus_overlap(left, right);

        Some(left.score - link_cost(g_overlap, r_overlap).abs())
    }
}

/// Overlap of the two alignments on the consensus, oriented by strand
pub fn consensus_overlap(left: &Record, right: &Record) -> i64 {
    let coord = |c: Option<i64>| c.unwrap_or(UNRESOLVED_CONSENSUS);
    match right.genomic.strand {
        Strand::Minus => coord(right.consensus_right) - coord(left.consensus_left),
        _ => coord(left.consensus_right) - coord(right.consensus_left),
    }
}

/// Signed cost of a link given genomic and consensus overlaps.
///
/// Positive overlap means the intervals overlap, negative means a gap.
pub fn link_cost(g_overlap: i64, r_overlap: i64) -> f64 {
    let g = g_overlap as f64;
    let r = r_overlap as f64;

    let magnitude = g.abs().powf(GENOMIC_TOLERANCE)
        * r.abs().powf(CONSENSUS_TOLERANCE)
        * (g - r).abs().powf(CONCORDANCE_TOLERANCE);

    if r_overlap == 0 {
        // Adjacent on the consensus.
        if g_overlap < 0 {
            g * 2.0
        } else {
            g * 100.0
        }
    } else if g_overlap == 0 {
        // Adjacent in the genome.
        if r_overlap < 0 {
            r * 40.0
        } else {
            r * 100.0
        }
    } else if r_overlap < 0 && g_overlap < 0 {
        // Separated parts.
        magnitude * 10.0
    } else if (r_overlap < 0) != (g_overlap < 0) {
        // Overlap in one space, separation in the other.
        magnitude * 100.0
    } else {
        // Co-overlap.
        magnitude * 10.0
    }
}
