//! repeat-stitch - Chaining of fragmented repeat annotations
//!
//! Repeat annotation tools report one element as several pieces when it is
//! interrupted by insertions or deletions. This crate chains such pieces
//! back into composite elements.
//!
//! # Features
//!
//! - Geometric link cost over genomic and consensus coordinates
//! - Bellman-Ford style chain optimizer with disjoint chain extraction
//! - Partitions chained concurrently with a bounded worker budget
//! - GFF and RepeatMasker `.out` input, gzip/bzip2 aware
//! - RepeatMasker ID chains and a per-class summary for comparing results
//!
//! # Example
//!
//! ```ignore
//! use repeat_stitch::{partition, stitch_all, StitchConfig};
//! use repeat_stitch::formats::gff;
//!
//! let records = gff::read_repeats(repeat_stitch::core::io::open_input("repeats.gff")?)?;
//! let config = StitchConfig::default().with_workers(4);
//! let composites = stitch_all(partition(records), &config)?.into_result()?;
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    chain_partition, partition, stitch_all, Assembly, Composite, CostModel, Feature, Genomic,
    GeometricCost, Part, PartitionKey, PartitionMap, Record, Result, StitchConfig, StitchError,
    Strand, Summary,
};
