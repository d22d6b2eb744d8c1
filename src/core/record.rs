//! Repeat records and composites
//!
//! A [`Record`] is one aligned repeat fragment (a "simple repeat"); a
//! [`Composite`] is a chain of records judged to be one repeat element.
//! All genomic coordinates are 0-based half-open.

use std::fmt;

/// Strand orientation of a repeat alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Plus,
    Minus,
    /// No strand information (`.` in annotation files)
    Unstranded,
}

impl Strand {
    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use repeat_stitch::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), Some(Strand::Unstranded));
    /// assert_eq!(Strand::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            '.' => Some(Strand::Unstranded),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unstranded => '.',
        }
    }

    /// Whether the strand is known
    pub fn is_known(&self) -> bool {
        !matches!(self, Strand::Unstranded)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A stranded genomic interval
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genomic {
    pub chrom: String,
    /// Start position (0-based)
    pub left: i64,
    /// End position (exclusive)
    pub right: i64,
    pub strand: Strand,
}

impl Genomic {
    pub fn new(chrom: impl Into<String>, left: i64, right: i64, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            left,
            right,
            strand,
        }
    }
}

impl fmt::Display for Genomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[{},{})", self.chrom, self.left, self.right)
    }
}

/// A masked repeat alignment
///
/// `consensus_left`/`consensus_right` locate the alignment on the repeat
/// family consensus (0-based half-open); `None` means the masker did not
/// report consensus coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Repeat type, e.g. `AluY`
    pub name: String,
    /// Repeat class, e.g. `SINE/Alu`
    pub class: String,
    pub score: f64,
    pub genomic: Genomic,
    pub consensus_left: Option<i64>,
    pub consensus_right: Option<i64>,
    /// Consensus bases beyond the alignment end
    pub consensus_remaining: Option<i64>,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        score: f64,
        genomic: Genomic,
        consensus_left: Option<i64>,
        consensus_right: Option<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            score,
            genomic,
            consensus_left,
            consensus_right,
            consensus_remaining: None,
        }
    }

    /// Project the record onto a composite part
    pub fn to_part(&self) -> Part {
        Part {
            name: self.name.clone(),
            consensus_left: self.consensus_left,
            consensus_right: self.consensus_right,
            genomic: self.genomic.clone(),
        }
    }
}

/// One record's contribution to a composite
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub consensus_left: Option<i64>,
    pub consensus_right: Option<i64>,
    pub genomic: Genomic,
}

/// A chain of repeat records forming one repeat element
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub class: String,
    pub score: f64,
    /// Parts in ascending genomic order, never empty
    pub parts: Vec<Part>,
}

impl Composite {
    pub fn first(&self) -> &Part {
        &self.parts[0]
    }

    pub fn chrom(&self) -> &str {
        &self.first().genomic.chrom
    }

    pub fn left(&self) -> i64 {
        self.first().genomic.left
    }

    /// Rightmost end of any part; parts may overlap so the last part need not end furthest right.
    pub fn right(&self) -> i64 {
        self.parts
            .iter()
            .map(|p| p.genomic.right)
            .max()
            .unwrap_or_else(|| self.left())
    }

    pub fn strand(&self) -> Strand {
        self.first().genomic.strand
    }
}

/// Annotation feature shapes written by the GFF adapter
#[derive(Debug, Clone, Copy)]
pub enum Feature<'a> {
    Simple(&'a Record),
    Composite(&'a Composite),
}

impl<'a> Feature<'a> {
    pub fn chrom(&self) -> &'a str {
        match self {
            Feature::Simple(r) => &r.genomic.chrom,
            Feature::Composite(c) => c.chrom(),
        }
    }

    pub fn start(&self) -> i64 {
        match self {
            Feature::Simple(r) => r.genomic.left,
            Feature::Composite(c) => c.left(),
        }
    }

    pub fn end(&self) -> i64 {
        match self {
            Feature::Simple(r) => r.genomic.right,
            Feature::Composite(c) => c.right(),
        }
    }

    pub fn strand(&self) -> Strand {
        match self {
            Feature::Simple(r) => r.genomic.strand,
            Feature::Composite(c) => c.strand(),
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Feature::Simple(r) => r.score,
            Feature::Composite(c) => c.score,
        }
    }

    pub fn class(&self) -> &'a str {
        match self {
            Feature::Simple(r) => &r.class,
            Feature::Composite(c) => &c.class,
        }
    }
}

impl<'a> From<&'a Record> for Feature<'a> {
    fn from(r: &'a Record) -> Self {
        Feature::Simple(r)
    }
}

impl<'a> From<&'a Composite> for Feature<'a> {
    fn from(c: &'a Composite) -> Self {
        Feature::Composite(c)
    }
}
