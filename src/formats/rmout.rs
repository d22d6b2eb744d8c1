//! RepeatMasker `.out` format adapter
//!
//! RepeatMasker reports one alignment per line after a three-line header:
//!
//! ```text
//!  SW  perc perc perc  query  position in query    matching  repeat     position in repeat
//! score  div. del. ins.  sequence  begin end (left)  repeat  class/family begin  end (left)  ID
//!
//!  1306  15.6  6.2  0.0  chr1  10001  10468 (249240153) +  (TAACCC)n  Simple_repeat  1  463  (0)  1
//! ```
//!
//! On the complement strand (`C`) the repeat columns are `(left) end begin`.
//! A trailing `*` marks an alignment overlapped by a higher-scoring one.
//!
//! RepeatMasker's own fragment joins are carried in the ID column;
//! [`chain_by_id`] turns them into composites for comparison with the
//! chain optimizer.

use crate::core::io::ByteLineIterator;
use crate::core::{Composite, Feature, Genomic, Record, Result, RmOutErrorKind, Strand};
use crate::formats::gff::format_feature;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Lines before the first alignment
pub const HEADER_LINES: usize = 3;

const SCORE_FIELD: usize = 0;
const QUERY_NAME_FIELD: usize = 4;
const QUERY_START_FIELD: usize = 5;
const QUERY_END_FIELD: usize = 6;
const STRAND_FIELD: usize = 8;
const REPEAT_TYPE_FIELD: usize = 9;
const REPEAT_CLASS_FIELD: usize = 10;
const REPEAT_POS1_FIELD: usize = 11;
const REPEAT_POS2_FIELD: usize = 12;
const REPEAT_POS3_FIELD: usize = 13;
const ID_FIELD: usize = 14;
const OTHER_MATCH_FIELD: usize = 15;

/// One RepeatMasker alignment
#[derive(Debug, Clone, PartialEq)]
pub struct RmOutRecord {
    pub score: f64,
    pub chrom: String,
    /// Query start (0-based)
    pub start: i64,
    /// Query end (exclusive)
    pub end: i64,
    pub strand: Strand,
    pub name: String,
    pub class: String,
    /// Consensus begin (0-based)
    pub consensus_left: i64,
    pub consensus_right: i64,
    pub consensus_remaining: i64,
    /// RepeatMasker element ID
    pub id: u64,
    /// Overlapped by a higher-scoring alignment
    pub other_match: bool,
}

fn number<T: std::str::FromStr>(fields: &[&str], idx: usize, name: &'static str) -> std::result::Result<T, RmOutErrorKind> {
    fields[idx]
        .parse()
        .map_err(|_| RmOutErrorKind::InvalidNumber(name, fields[idx].to_string()))
}

/// `(123)` -> `123`
fn parenthesised(s: &str) -> Option<&str> {
    s.strip_prefix('(')?.strip_suffix(')')
}

impl RmOutRecord {
    /// Parse one whitespace-separated alignment line
    pub fn parse(line: &str) -> std::result::Result<Self, RmOutErrorKind> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= ID_FIELD {
            return Err(RmOutErrorKind::TooFewFields(fields.len()));
        }

        let strand = match fields[STRAND_FIELD] {
            "+" => Strand::Plus,
            "C" => Strand::Minus,
            s => return Err(RmOutErrorKind::InvalidStrand(s.to_string())),
        };

        let pos = &fields[REPEAT_POS1_FIELD..=REPEAT_POS3_FIELD];
        let (left, right, remaining) = if let Some(rem) = parenthesised(pos[0]) {
            (pos[2], pos[1], rem)
        } else if let Some(rem) = parenthesised(pos[2]) {
            (pos[0], pos[1], rem)
        } else {
            return Err(RmOutErrorKind::InvalidRepeatCoordinates(pos.join(" ")));
        };
        let coord = |s: &str| -> std::result::Result<i64, RmOutErrorKind> {
            s.parse()
                .map_err(|_| RmOutErrorKind::InvalidRepeatCoordinates(pos.join(" ")))
        };

        let score: f64 = number(&fields, SCORE_FIELD, "score")?;
        if !score.is_finite() {
            return Err(RmOutErrorKind::InvalidNumber("score", fields[SCORE_FIELD].to_string()));
        }
        let start: i64 = number(&fields, QUERY_START_FIELD, "query start")?;
        let end: i64 = number(&fields, QUERY_END_FIELD, "query end")?;
        if start < 1 || start > end {
            return Err(RmOutErrorKind::InvalidInterval { start, end });
        }

        Ok(Self {
            score,
            chrom: fields[QUERY_NAME_FIELD].to_string(),
            start: start - 1,
            end,
            strand,
            name: fields[REPEAT_TYPE_FIELD].to_string(),
            class: fields[REPEAT_CLASS_FIELD].to_string(),
            consensus_left: coord(left)? - 1,
            consensus_right: coord(right)?,
            consensus_remaining: coord(remaining)?,
            id: number(&fields, ID_FIELD, "ID")?,
            other_match: fields.get(OTHER_MATCH_FIELD) == Some(&"*"),
        })
    }

    /// Convert to a repeat record for chaining
    pub fn to_record(&self) -> Record {
        Record {
            name: self.name.clone(),
            class: self.class.clone(),
            score: self.score,
            genomic: Genomic::new(self.chrom.clone(), self.start, self.end, self.strand),
            consensus_left: Some(self.consensus_left),
            consensus_right: Some(self.consensus_right),
            consensus_remaining: Some(self.consensus_remaining),
        }
    }
}

/// Read all alignments, skipping the header and blank lines
pub fn read_rmout<R: BufRead>(reader: R) -> Result<Vec<RmOutRecord>> {
    let mut lines = ByteLineIterator::new(reader);
    let mut records = Vec::new();
    while let Some(line) = lines.next_line() {
        let text = String::from_utf8_lossy(line?).into_owned();
        let line_number = lines.line_number();
        if line_number <= HEADER_LINES || text.trim().is_empty() {
            continue;
        }
        records.push(RmOutRecord::parse(&text).map_err(|kind| kind.at(line_number))?);
    }
    Ok(records)
}

/// Read alignments as repeat records
pub fn read_repeats<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    Ok(read_rmout(reader)?.iter().map(RmOutRecord::to_record).collect())
}

/// Conversion statistics
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    pub total: usize,
    pub other_match: usize,
}

/// Convert RepeatMasker output to GFF repeat features.
///
/// With `mark_other`, alignments overlapped by a higher-scoring match get an
/// `OtherMatch yes` attribute.
pub fn convert_rmout<R, W>(reader: R, writer: &mut W, mark_other: bool) -> Result<ConversionStats>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut stats = ConversionStats::default();
    for rm in read_rmout(reader)? {
        let record = rm.to_record();
        let line = format_feature(Feature::Simple(&record));
        stats.total += 1;
        if mark_other && rm.other_match {
            stats.other_match += 1;
            writeln!(writer, "{}; OtherMatch yes", line)?;
        } else {
            writeln!(writer, "{}", line)?;
        }
    }
    Ok(stats)
}

/// Composite of the alignments RepeatMasker assigned one ID
#[derive(Debug, Clone, PartialEq)]
pub struct IdChain {
    pub id: u64,
    pub composite: Composite,
}

impl IdChain {
    /// Composite GFF line with an extra `ID` attribute
    pub fn to_gff_line(&self) -> String {
        format!(
            "{}; ID {}",
            format_feature(Feature::Composite(&self.composite)),
            self.id
        )
    }
}

/// Chain alignments by their RepeatMasker ID.
///
/// IDs held by a single alignment are dropped. Parts are ordered by
/// `(chrom, start)`, the class is taken from the first part and the score is
/// the sum of the alignment scores. Chains come out in ascending ID order.
pub fn chain_by_id(records: Vec<RmOutRecord>) -> Vec<IdChain> {
    let mut groups: BTreeMap<u64, Vec<RmOutRecord>> = BTreeMap::new();
    for rm in records {
        groups.entry(rm.id).or_default().push(rm);
    }
    let ids = groups.len();

    let chains: Vec<IdChain> = groups
        .into_iter()
        .filter(|(_, group)| group.len() >= 2)
        .map(|(id, mut group)| {
            group.sort_by(|a, b| a.chrom.cmp(&b.chrom).then(a.start.cmp(&b.start)));
            IdChain {
                id,
                composite: Composite {
                    class: group[0].class.clone(),
                    score: group.iter().map(|rm| rm.score).sum(),
                    parts: group.iter().map(|rm| rm.to_record().to_part()).collect(),
                },
            }
        })
        .collect();

    log::info!("{} IDs, {} with more than one alignment", ids, chains.len());
    chains
}

/// Chain RepeatMasker output by ID and write the composites as GFF.
///
/// Returns the number of composites written.
pub fn stitch_by_id<R, W>(reader: R, writer: &mut W) -> Result<usize>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let chains = chain_by_id(read_rmout(reader)?);
    for chain in &chains {
        writeln!(writer, "{}", chain.to_gff_line())?;
    }
    Ok(chains.len())
}
