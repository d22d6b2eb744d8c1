//! Chain optimizer
//!
//! Finds maximum-score chains of records within one block and extracts a
//! disjoint set of them as composites.
//!
//! The relaxation is Bellman-Ford over the block's implicit DAG (links only
//! run from a record to one ending further right): every round recomputes
//! each record's best chain score from the previous round's row, so after
//! `r` rounds `best[j]` is the best chain of at most `r + 1` records ending
//! at `j`. Chains cannot be longer than the block, so `n - 1` rounds reach
//! the fixed point; a round that changes nothing reaches it early. Only two
//! rows are kept.
//!
//! Extraction walks from the right end of the block. Each unclaimed record
//! is traced back through its predecessor links; the records on the path
//! are claimed so that no record appears in two composites. Chains ending
//! further right are therefore preferred when candidate chains overlap.

use crate::core::{Composite, CostModel, Record};

/// Chain link table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Best chain score ending at this record
    pub best: f64,
    /// Predecessor index; equal to the entry's own index for a chain root
    pub predecessor: usize,
}

/// Run the relaxation and return the converged link table.
///
/// `block` must be sorted by right end so that the first refused link
/// ends the scan over predecessors.
pub fn relax<C>(block: &[&Record], cost: &C) -> Vec<Link>
where
    C: CostModel + ?Sized,
{
    let n = block.len();
    let mut prev: Vec<Link> = block
        .iter()
        .enumerate()
        .map(|(i, r)| Link {
            best: r.score,
            predecessor: i,
        })
        .collect();
    let mut next = prev.clone();

    for round in 1..n {
        let mut changed = false;
        for j in 0..n {
            let best = best_link(block, &prev, j, cost);
            changed |= best != prev[j];
            next[j] = best;
        }
        std::mem::swap(&mut prev, &mut next);
        if !changed {
            log::trace!("relaxation converged after {} of {} rounds", round, n - 1);
            break;
        }
    }

    prev
}

fn best_link<C>(block: &[&Record], prev: &[Link], j: usize, cost: &C) -> Link
where
    C: CostModel + ?Sized,
{
    let mut best = prev[j];
    let right = block[j];
    for k in (0..j).rev() {
        // Sorted by right end: once the span is exceeded no earlier k can link.
        let Some(score) = cost.link(block[k], right) else {
            break;
        };
        let score = score + prev[k].best;
        if score > best.best {
            best = Link {
                best: score,
                predecessor: k,
            };
        }
    }
    best
}

/// Chain the records of one block into disjoint composites.
///
/// Records that do not join any chain are dropped; single-record
/// composites are never produced.
pub fn stitch<C>(block: &[&Record], cost: &C) -> Vec<Composite>
where
    C: CostModel + ?Sized,
{
    if block.len() < 2 {
        return Vec::new();
    }
    let table = relax(block, cost);
    extract(block, &table, cost)
}

/// Extract disjoint chains from a converged link table, rightmost first.
pub fn extract<C>(block: &[&Record], table: &[Link], cost: &C) -> Vec<Composite>
where
    C: CostModel + ?Sized,
{
    let mut claimed = vec![false; table.len()];
    let mut composites = Vec::new();

    for i in (0..table.len()).rev() {
        if claimed[i] {
            continue;
        }

        let mut path = vec![i];
        let mut truncated = false;
        let mut p = i;
        while table[p].predecessor != p {
            let q = table[p].predecessor;
            if claimed[q] {
                truncated = true;
                break;
            }
            path.push(q);
            p = q;
        }
        if path.len() < 2 {
            continue;
        }

        for &idx in &path {
            claimed[idx] = true;
        }
        path.reverse();

        let score = if truncated {
            path_score(block, &path, cost)
        } else {
            table[i].best
        };

        let mut parts: Vec<_> = path.iter().map(|&k| block[k].to_part()).collect();
        parts.sort_by_key(|p| p.genomic.left);

        composites.push(Composite {
            class: block[i].class.clone(),
            score,
            parts,
        });
    }

    composites
}

/// Score of a chain following `path` (ascending indices) from its root
fn path_score<C>(block: &[&Record], path: &[usize], cost: &C) -> f64
where
    C: CostModel + ?Sized,
{
    let mut score = block[path[0]].score;
    for w in path.windows(2) {
        score += cost
            .link(block[w[0]], block[w[1]])
            .unwrap_or(f64::NEG_INFINITY);
    }
    score
}
