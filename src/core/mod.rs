//! Core chaining functionality
//!
//! This module contains the repeat record model, the link cost model,
//! partitioning, block segmentation, the chain optimizer, the concurrent
//! scheduler and the per-class output summary.

pub mod assemble;
pub mod block;
mod config;
pub mod cost;
mod error;
pub mod io;
mod partition;
mod record;
pub mod scheduler;
pub mod stitch;
pub mod summary;

pub use assemble::{sort_composites, Assembly};
pub use block::{segment, Blocks, Segmentation, SkipReason, DEFAULT_MAX_SEPARATION};
pub use config::StitchConfig;
pub use cost::{CostModel, GeometricCost, DEFAULT_MAX_SPAN};
pub use error::{
    GffErrorKind, GffParseError, Result, RmOutErrorKind, RmOutParseError, StitchError,
};
pub use partition::{partition, PartitionKey, PartitionMap};
pub use record::{Composite, Feature, Genomic, Part, Record, Strand};
pub use scheduler::{chain_partition, stitch_all, BlockBatch, TaskMessage};
pub use summary::{is_discordant, ClassSummary, Summary};
