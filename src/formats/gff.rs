//! GFF format adapter
//!
//! Reads RepeatMasker-derived GFF repeat features and writes repeat and
//! composite features. GFF uses 1-based inclusive coordinates; records are
//! 0-based half-open.
//!
//! Repeat features carry their consensus alignment in a `Repeat` attribute:
//!
//! ```text
//! chr1  RepeatMasker  repeat  1001  1300  2345  +  .  Repeat AluY SINE/Alu 3 295 17
//! ```
//!
//! `3 295` are the consensus start and end (1-based, `.` when unknown) and
//! `17` the consensus bases remaining past the alignment end. Composites are
//! written with `Class` and `Parts` attributes, each part rendered as
//! `name consensusStart consensusEnd genomicStart genomicEnd`, and can be
//! read back with [`read_composites`].

use crate::core::io::ByteLineIterator;
use crate::core::{
    Composite, Feature, Genomic, GffErrorKind, Part, Record, Result, Strand,
};
use memchr::memchr;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

/// GFF source written for composites
pub const COMPOSITE_SOURCE: &str = "stitch";
/// GFF feature type written for composites
pub const COMPOSITE_FEATURE: &str = "composite";
/// GFF source written for repeats
pub const REPEAT_SOURCE: &str = "RepeatMasker";
/// GFF feature type written for repeats
pub const REPEAT_FEATURE: &str = "repeat";

/// Marker for an unavailable consensus coordinate
const UNKNOWN: &str = ".";

/// Zero-copy GFF record view for parsing
/// GFF format: seqname, source, feature, start, end, score, strand, frame, attributes
/// All coordinates are 1-based, closed interval [start, end]
pub struct GffRecordView<'a> {
    /// Sequence name (chromosome)
    pub seqname: &'a str,
    pub source: &'a str,
    pub feature: &'a str,
    /// Start position (1-based)
    pub start: i64,
    /// End position (1-based, inclusive)
    pub end: i64,
    /// Score, `None` for "."
    pub score: Option<f64>,
    pub strand: Strand,
    pub frame: &'a str,
    pub attributes: &'a str,
}

impl<'a> GffRecordView<'a> {
    /// Parse a GFF line with minimal allocation
    /// GFF has exactly 9 tab-separated fields
    pub fn parse(line: &'a [u8]) -> std::result::Result<Self, GffErrorKind> {
        let mut field_bounds = Vec::with_capacity(9);
        let mut start_pos = 0;
        while let Some(tab_pos) = memchr(b'\t', &line[start_pos..]) {
            field_bounds.push((start_pos, start_pos + tab_pos));
            start_pos += tab_pos + 1;
        }
        field_bounds.push((start_pos, line.len()));

        if field_bounds.len() < 9 {
            return Err(GffErrorKind::TooFewFields(field_bounds.len()));
        }

        let get_field = |idx: usize, name: &'static str| -> std::result::Result<&'a str, GffErrorKind> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GffErrorKind::InvalidUtf8(name))
        };
        let get_number = |idx: usize, name: &'static str| -> std::result::Result<i64, GffErrorKind> {
            let s = get_field(idx, name)?;
            s.trim()
                .parse()
                .map_err(|_| GffErrorKind::InvalidNumber(name, s.to_string()))
        };

        let seqname = get_field(0, "seqname")?;
        let source = get_field(1, "source")?;
        let feature = get_field(2, "feature")?;
        let start = get_number(3, "start")?;
        let end = get_number(4, "end")?;
        if start > end {
            return Err(GffErrorKind::InvalidInterval { start, end });
        }

        let score_str = get_field(5, "score")?;
        let score = match score_str {
            UNKNOWN => None,
            s => Some(
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| GffErrorKind::InvalidNumber("score", s.to_string()))?,
            ),
        };

        let strand_str = get_field(6, "strand")?;
        let strand = match strand_str.as_bytes() {
            [c] => Strand::from_char(*c as char),
            _ => None,
        }
        .ok_or_else(|| GffErrorKind::InvalidStrand(strand_str.to_string()))?;

        Ok(Self {
            seqname,
            source,
            feature,
            start,
            end,
            score,
            strand,
            frame: get_field(7, "frame")?,
            attributes: get_field(8, "attributes")?,
        })
    }

    /// Value of attribute `tag`, with surrounding quotes removed
    pub fn attribute(&self, tag: &str) -> Option<&'a str> {
        attribute(self.attributes, tag)
    }

    /// Build a repeat record from the feature and its `Repeat` attribute
    pub fn to_record(&self) -> std::result::Result<Record, GffErrorKind> {
        let repeat = self
            .attribute("Repeat")
            .filter(|v| !v.is_empty())
            .ok_or(GffErrorKind::MissingRepeat)?;
        let repeat = RepeatAttribute::parse(repeat)?;

        Ok(Record {
            name: repeat.name.to_string(),
            class: repeat.class.to_string(),
            score: self.score.unwrap_or(0.0),
            genomic: Genomic::new(self.seqname, self.start - 1, self.end, self.strand),
            consensus_left: repeat.left,
            consensus_right: repeat.right,
            consensus_remaining: repeat.remaining,
        })
    }

    /// Build a composite from a `stitch` feature's `Class` and `Parts` attributes
    pub fn to_composite(&self) -> std::result::Result<Composite, GffErrorKind> {
        let class = self
            .attribute("Class")
            .filter(|v| !v.is_empty())
            .ok_or(GffErrorKind::MissingComposite("Class"))?;
        let parts = self
            .attribute("Parts")
            .filter(|v| !v.is_empty())
            .ok_or(GffErrorKind::MissingComposite("Parts"))?;

        Ok(Composite {
            class: class.to_string(),
            score: self.score.unwrap_or(0.0),
            parts: parse_parts(parts, self.seqname, self.strand)?,
        })
    }
}

/// Parse a `|`-separated part list as written by [`format_parts`], quotes removed.
///
/// Parts carry no chromosome or strand of their own; both come from the
/// composite feature.
pub fn parse_parts(
    value: &str,
    chrom: &str,
    strand: Strand,
) -> std::result::Result<Vec<Part>, GffErrorKind> {
    value
        .split('|')
        .map(|text| {
            let invalid = || GffErrorKind::InvalidPart(text.to_string());
            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.len() != 5 {
                return Err(invalid());
            }
            let coord = |s: &str| -> std::result::Result<Option<i64>, GffErrorKind> {
                if s == UNKNOWN {
                    return Ok(None);
                }
                s.parse().map(Some).map_err(|_| invalid())
            };
            let genomic = |s: &str| -> std::result::Result<i64, GffErrorKind> {
                s.parse().map_err(|_| invalid())
            };

            let left = genomic(fields[3])? - 1;
            let right = genomic(fields[4])?;
            if left >= right {
                return Err(invalid());
            }
            Ok(Part {
                name: fields[0].to_string(),
                consensus_left: coord(fields[1])?.map(|l| l - 1),
                consensus_right: coord(fields[2])?,
                genomic: Genomic::new(chrom, left, right, strand),
            })
        })
        .collect()
}

/// Find attribute `tag` in a `;`-separated `Tag value` list
pub fn attribute<'a>(attributes: &'a str, tag: &str) -> Option<&'a str> {
    attributes.split(';').find_map(|pair| {
        let pair = pair.trim();
        let (t, value) = pair.split_once(char::is_whitespace).unwrap_or((pair, ""));
        (t == tag).then(|| value.trim().trim_matches('"'))
    })
}

/// Parsed `Repeat` attribute, consensus coordinates 0-based half-open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatAttribute<'a> {
    pub name: &'a str,
    pub class: &'a str,
    pub left: Option<i64>,
    pub right: Option<i64>,
    pub remaining: Option<i64>,
}

impl<'a> RepeatAttribute<'a> {
    /// Parse `name class start end [remaining]`; `.` marks an unknown value
    pub fn parse(value: &'a str) -> std::result::Result<Self, GffErrorKind> {
        let fields: Vec<&str> = value.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(GffErrorKind::InvalidRepeat(value.to_string()));
        }

        let coord = |s: &str| -> std::result::Result<Option<i64>, GffErrorKind> {
            if s == UNKNOWN {
                return Ok(None);
            }
            s.parse()
                .map(Some)
                .map_err(|_| GffErrorKind::InvalidRepeat(value.to_string()))
        };

        let left = coord(fields[2])?.map(|l| l - 1);
        let right = coord(fields[3])?;
        let remaining = match fields.get(4) {
            Some(s) => coord(s)?,
            None => None,
        };

        Ok(Self {
            name: fields[0],
            class: fields[1],
            left,
            right,
            remaining,
        })
    }
}

/// Read repeat records from GFF text.
///
/// Blank lines and `#` comments are skipped. The first malformed line aborts
/// the read: a corrupted coordinate cannot be isolated to one partition.
pub fn read_repeats<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut lines = ByteLineIterator::new(reader);
    let mut records = Vec::new();
    while let Some(line) = lines.next_line() {
        let line = line?;
        if line.is_empty() || line[0] == b'#' {
            continue;
        }
        let parsed = GffRecordView::parse(line).and_then(|view| view.to_record());
        records.push(parsed.map_err(|kind| kind.at(lines.line_number()))?);
    }
    Ok(records)
}

/// Read composites from `stitch` output.
///
/// Only features with source `stitch` are read; repeat features and comments
/// are skipped.
pub fn read_composites<R: BufRead>(reader: R) -> Result<Vec<Composite>> {
    let mut lines = ByteLineIterator::new(reader);
    let mut composites = Vec::new();
    while let Some(line) = lines.next_line() {
        let line = line?;
        if line.is_empty() || line[0] == b'#' {
            continue;
        }
        let parsed = GffRecordView::parse(line).and_then(|view| {
            if view.source != COMPOSITE_SOURCE {
                return Ok(None);
            }
            view.to_composite().map(Some)
        });
        if let Some(composite) = parsed.map_err(|kind| kind.at(lines.line_number()))? {
            composites.push(composite);
        }
    }
    Ok(composites)
}

fn one_based(left: Option<i64>) -> String {
    left.map_or_else(|| UNKNOWN.to_string(), |l| (l + 1).to_string())
}

fn end_coord(right: Option<i64>) -> String {
    right.map_or_else(|| UNKNOWN.to_string(), |r| r.to_string())
}

/// Render composite parts as a quoted, `|`-separated list
pub fn format_parts(parts: &[Part]) -> String {
    let mut buf = String::from("\"");
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            buf.push('|');
        }
        let _ = write!(
            buf,
            "{} {} {} {} {}",
            p.name,
            one_based(p.consensus_left),
            end_coord(p.consensus_right),
            p.genomic.left + 1,
            p.genomic.right
        );
    }
    buf.push('"');
    buf
}

fn repeat_attributes(r: &Record) -> String {
    format!(
        "Repeat {} {} {} {} {}",
        r.name,
        r.class,
        one_based(r.consensus_left),
        end_coord(r.consensus_right),
        end_coord(r.consensus_remaining)
    )
}

fn composite_attributes(c: &Composite) -> String {
    format!("Class \"{}\"; Parts {}", c.class, format_parts(&c.parts))
}

/// Format a feature as one GFF line (no trailing newline)
pub fn format_feature(feature: Feature) -> String {
    let (source, kind, attributes) = match feature {
        Feature::Simple(r) => (REPEAT_SOURCE, REPEAT_FEATURE, repeat_attributes(r)),
        Feature::Composite(c) => (COMPOSITE_SOURCE, COMPOSITE_FEATURE, composite_attributes(c)),
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t.\t{}",
        feature.chrom(),
        source,
        kind,
        feature.start() + 1,
        feature.end(),
        feature.score(),
        feature.strand(),
        attributes
    )
}

/// Write features one per line, returning the number written
pub fn write_features<'a, W, I>(writer: &mut W, features: I) -> std::io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = Feature<'a>>,
{
    let mut n = 0;
    for feature in features {
        writeln!(writer, "{}", format_feature(feature))?;
        n += 1;
    }
    Ok(n)
}
