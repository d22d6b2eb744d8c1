//! Collection and ordering of composites
//!
//! Composites arrive from the scheduler in no particular order. They are
//! gathered into one list and sorted by genome location with a total
//! tie-break, so output does not depend on task scheduling.

use crate::core::scheduler::{BlockBatch, TaskMessage};
use crate::core::{Composite, Result, StitchError};
use crossbeam_channel::Receiver;
use std::cmp::Ordering;
use std::collections::HashSet;

/// All composites of a run plus any partition failures
///
/// A partition that faults contributes nothing: blocks it finished before the
/// fault are discarded, so `composites` only holds complete partitions.
#[derive(Debug, Default)]
pub struct Assembly {
    /// Sorted composites from every successful partition
    pub composites: Vec<Composite>,
    /// Partition tasks that faulted
    pub failures: Vec<StitchError>,
    /// Number of block batches kept
    pub batches: usize,
}

impl Assembly {
    /// Composites if every partition succeeded, otherwise the first failure
    pub fn into_result(mut self) -> Result<Vec<Composite>> {
        if self.failures.is_empty() {
            Ok(self.composites)
        } else {
            Err(self.failures.swap_remove(0))
        }
    }

    /// Number of records that ended up in a composite
    pub fn chained_records(&self) -> usize {
        self.composites.iter().map(|c| c.parts.len()).sum()
    }
}

/// Drain the result stream until every task has finished, then sort
pub fn collect(receiver: Receiver<TaskMessage>) -> Assembly {
    let mut batches: Vec<BlockBatch> = Vec::new();
    let mut failed: HashSet<String> = HashSet::new();
    let mut assembly = Assembly::default();

    for message in receiver {
        match message {
            Ok(batch) => batches.push(batch),
            Err(err) => {
                log::error!("{}", err);
                if let StitchError::TaskFailed { partition, .. } = &err {
                    failed.insert(partition.clone());
                }
                assembly.failures.push(err);
            }
        }
    }

    for batch in batches {
        if !failed.is_empty() && failed.contains(&batch.partition.to_string()) {
            log::debug!("{} discarding {} composites", batch.partition, batch.composites.len());
            continue;
        }
        assembly.batches += 1;
        assembly.composites.extend(batch.composites);
    }
    sort_composites(&mut assembly.composites);
    assembly
}

/// Sort by `(chrom, left)` of the first part.
///
/// Ties are broken by right end, class, first part name and descending
/// score; strand and the parts themselves make the order total.
pub fn sort_composites(composites: &mut [Composite]) {
    composites.sort_by(compare_location);
}

/// Genome-location ordering used for output
pub fn compare_location(a: &Composite, b: &Composite) -> Ordering {
    a.chrom()
        .cmp(b.chrom())
        .then(a.left().cmp(&b.left()))
        .then(a.right().cmp(&b.right()))
        .then_with(|| a.class.cmp(&b.class))
        .then_with(|| a.first().name.cmp(&b.first().name))
        .then(b.score.total_cmp(&a.score))
        .then(a.strand().cmp(&b.strand()))
        .then_with(|| {
            let key = |c: &Composite| {
                c.parts
                    .iter()
                    .map(|p| (p.genomic.left, p.genomic.right, p.name.clone()))
                    .collect::<Vec<_>>()
            };
            key(a).cmp(&key(b))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Genomic, Part, PartitionKey, Strand};

    fn composite(chrom: &str, class: &str, spans: &[(i64, i64)], score: f64) -> Composite {
        Composite {
            class: class.to_string(),
            score,
            parts: spans
                .iter()
                .map(|&(l, r)| Part {
                    name: "rep".to_string(),
                    consensus_left: Some(0),
                    consensus_right: Some(10),
                    genomic: Genomic::new(chrom, l, r, Strand::Plus),
                })
                .collect(),
        }
    }

    #[test]
    fn test_sort_by_chrom_then_left() {
        let mut all = vec![
            composite("chr2", "A", &[(10, 20), (20, 30)], 1.0),
            composite("chr1", "A", &[(50, 60), (60, 70)], 1.0),
            composite("chr1", "A", &[(10, 20), (20, 30)], 1.0),
        ];
        sort_composites(&mut all);
        let order: Vec<_> = all.iter().map(|c| (c.chrom().to_string(), c.left())).collect();
        assert_eq!(
            order,
            vec![
                ("chr1".to_string(), 10),
                ("chr1".to_string(), 50),
                ("chr2".to_string(), 10)
            ]
        );
    }

    #[test]
    fn test_ties_are_broken_deterministically() {
        let a = composite("chr1", "SINE/Alu", &[(10, 20), (20, 40)], 5.0);
        let b = composite("chr1", "LINE/L1", &[(10, 20), (20, 40)], 5.0);
        let c = composite("chr1", "LINE/L1", &[(10, 20), (20, 30)], 5.0);
        let d = composite("chr1", "LINE/L1", &[(10, 20), (20, 30)], 9.0);

        let mut forward = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let mut backward = vec![d, c, b, a];
        sort_composites(&mut forward);
        sort_composites(&mut backward);
        assert_eq!(forward, backward);

        // Shorter extent first, then higher score first.
        assert_eq!(forward[0].right(), 30);
        assert_eq!(forward[0].score, 9.0);
        assert_eq!(forward[2].class, "LINE/L1");
        assert_eq!(forward[3].class, "SINE/Alu");
    }

    fn key(class: &str) -> PartitionKey {
        PartitionKey {
            chrom: "chr1".to_string(),
            strand: Strand::Plus,
            class: class.to_string(),
        }
    }

    #[test]
    fn test_collect_drains_until_closed() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(Ok(BlockBatch {
            partition: key("A"),
            composites: vec![composite("chr1", "A", &[(50, 60), (60, 70)], 1.0)],
        }))
        .unwrap();
        tx.send(Err(StitchError::TaskFailed {
            partition: key("B").to_string(),
            message: "boom".to_string(),
        }))
        .unwrap();
        tx.send(Ok(BlockBatch {
            partition: key("A"),
            composites: vec![composite("chr1", "A", &[(10, 20), (20, 30)], 1.0)],
        }))
        .unwrap();
        drop(tx);

        let assembly = collect(rx);
        assert_eq!(assembly.batches, 2);
        assert_eq!(assembly.failures.len(), 1);
        assert_eq!(assembly.composites[0].left(), 10);
        assert_eq!(assembly.chained_records(), 4);
        assert!(assembly.into_result().is_err());
    }

    #[test]
    fn test_failed_partition_batches_are_discarded() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(Ok(BlockBatch {
            partition: key("B"),
            composites: vec![composite("chr1", "B", &[(10, 20), (20, 30)], 1.0)],
        }))
        .unwrap();
        tx.send(Ok(BlockBatch {
            partition: key("A"),
            composites: vec![composite("chr1", "A", &[(50, 60), (60, 70)], 1.0)],
        }))
        .unwrap();
        tx.send(Err(StitchError::TaskFailed {
            partition: key("B").to_string(),
            message: "boom".to_string(),
        }))
        .unwrap();
        drop(tx);

        let assembly = collect(rx);
        assert_eq!(assembly.batches, 1);
        assert_eq!(assembly.composites.len(), 1);
        assert_eq!(assembly.composites[0].class, "A");
        assert_eq!(assembly.failures.len(), 1);
    }
}
