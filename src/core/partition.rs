//! Grouping of records into chainable partitions

use crate::core::{Record, Strand};
use std::collections::HashMap;
use std::fmt;

/// Records sharing a key are candidates for the same chain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub chrom: String,
    pub strand: Strand,
    pub class: String,
}

impl PartitionKey {
    pub fn of(record: &Record) -> Self {
        Self {
            chrom: record.genomic.chrom.clone(),
            strand: record.genomic.strand,
            class: record.class.clone(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chr:{} strand:({}) class:{}",
            self.chrom, self.strand, self.class
        )
    }
}

/// Partition key -> records in arrival order
pub type PartitionMap = HashMap<PartitionKey, Vec<Record>>;

/// Group records by `(chrom, strand, class)`, preserving arrival order
pub fn partition<I>(records: I) -> PartitionMap
where
    I: IntoIterator<Item = Record>,
{
    let mut map: PartitionMap = HashMap::new();
    for record in records {
        map.entry(PartitionKey::of(&record))
            .or_default()
            .push(record);
    }
    map
}
