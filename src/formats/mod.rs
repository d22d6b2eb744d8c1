//! File format adapters
//!
//! Adapters for repeat annotation formats (GFF repeat features and
//! RepeatMasker `.out` tables).

pub mod gff;
pub mod rmout;

pub use gff::{
    format_feature, parse_parts, read_composites, read_repeats, write_features, GffRecordView,
    RepeatAttribute,
};
pub use rmout::{
    chain_by_id, convert_rmout, read_rmout, stitch_by_id, ConversionStats as RmOutConversionStats,
    IdChain, RmOutRecord,
};
