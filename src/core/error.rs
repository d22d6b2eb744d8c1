//! Error types for repeat-stitch
//!
//! Defines all error types used throughout the library.

use thiserror::Error;

/// Main error type for repeat-stitch operations
#[derive(Debug, Error)]
pub enum StitchError {
    /// GFF annotation parsing errors
    #[error("GFF parse error: {0}")]
    Gff(#[from] GffParseError),

    /// RepeatMasker output parsing errors
    #[error("RepeatMasker parse error: {0}")]
    RmOut(#[from] RmOutParseError),

    /// A partition task faulted; other partitions are unaffected
    #[error("Partition {partition} failed: {message}")]
    TaskFailed { partition: String, message: String },

    /// Invalid chaining parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A malformed GFF line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct GffParseError {
    /// Line number where the error occurred (1-based)
    pub line: usize,
    pub kind: GffErrorKind,
}

/// Specific kinds of GFF parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GffErrorKind {
    #[error("Too few fields: expected 9, found {0}")]
    TooFewFields(usize),

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid interval: start ({start}) > end ({end})")]
    InvalidInterval { start: i64, end: i64 },

    #[error("Missing Repeat attribute: file probably not a RepeatMasker GFF")]
    MissingRepeat,

    #[error("Malformed Repeat attribute '{0}'")]
    InvalidRepeat(String),

    #[error("Missing {0} attribute: file probably not a stitch GFF")]
    MissingComposite(&'static str),

    #[error("Malformed part '{0}'")]
    InvalidPart(String),
}

impl GffErrorKind {
    pub fn at(self, line: usize) -> GffParseError {
        GffParseError { line, kind: self }
    }
}

/// A malformed RepeatMasker `.out` line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct RmOutParseError {
    /// Line number where the error occurred (1-based)
    pub line: usize,
    pub kind: RmOutErrorKind,
}

/// Specific kinds of RepeatMasker parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RmOutErrorKind {
    #[error("Too few fields: expected at least 15, found {0}")]
    TooFewFields(usize),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Illegal strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid interval: begin ({start}) > end ({end})")]
    InvalidInterval { start: i64, end: i64 },

    #[error("Illegal repeat coordinates: {0}")]
    InvalidRepeatCoordinates(String),
}

impl RmOutErrorKind {
    pub fn at(self, line: usize) -> RmOutParseError {
        RmOutParseError { line, kind: self }
    }
}

/// Result type alias for repeat-stitch operations
pub type Result<T> = std::result::Result<T, StitchError>;
