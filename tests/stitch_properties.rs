//! Chain optimizer property tests
//!
//! Tests for block segmentation and chain extraction: disjointness,
//! singleton suppression, determinism and the two distance thresholds.

use proptest::prelude::*;
use repeat_stitch::core::stitch::{relax, stitch};
use repeat_stitch::core::{segment, Segmentation};
use repeat_stitch::{chain_partition, Composite, Genomic, GeometricCost, PartitionKey, Record, Strand};
use std::collections::{HashMap, HashSet};

const CLASS: &str = "LINE/L1";

// ============================================================================
// Generators
// ============================================================================

fn record(name: String, left: i64, len: i64, cl: i64, clen: i64, score: f64) -> Record {
    Record::new(
        name,
        CLASS,
        score,
        Genomic::new("chr1", left, left + len, Strand::Plus),
        Some(cl),
        Some(cl + clen),
    )
}

/// Generate records with unique names `{prefix}{i}`, lefts starting at `offset`
fn arb_records(
    prefix: &'static str,
    offset: i64,
    extent: i64,
    size: std::ops::Range<usize>,
) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (0..extent, 1i64..800, 0i64..6000, 1i64..800, 1.0f64..3000.0),
        size,
    )
    .prop_map(move |raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (left, len, cl, clen, score))| {
                record(format!("{}{}", prefix, i), offset + left, len, cl, clen, score)
            })
            .collect()
    })
}

/// Records sorted by right end, as a block
fn as_block(records: &[Record]) -> Vec<&Record> {
    let mut block: Vec<&Record> = records.iter().collect();
    block.sort_by_key(|r| r.genomic.right);
    block
}

fn names(composites: &[Composite]) -> Vec<String> {
    composites
        .iter()
        .flat_map(|c| c.parts.iter().map(|p| p.name.clone()))
        .collect()
}

fn key() -> PartitionKey {
    PartitionKey {
        chrom: "chr1".to_string(),
        strand: Strand::Plus,
        class: CLASS.to_string(),
    }
}

// ============================================================================
// Property Tests for Chain Extraction
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: no record appears in two composites
    #[test]
    fn prop_composites_are_disjoint(records in arb_records("r", 0, 20_000, 2..40)) {
        let composites = stitch(&as_block(&records), &GeometricCost::default());
        let all = names(&composites);
        let unique: HashSet<&String> = all.iter().collect();
        prop_assert_eq!(all.len(), unique.len());
    }

    /// Property: every composite has two or more parts in genomic order
    #[test]
    fn prop_no_singleton_composites(records in arb_records("r", 0, 20_000, 2..40)) {
        let composites = stitch(&as_block(&records), &GeometricCost::default());
        for c in &composites {
            prop_assert!(c.parts.len() >= 2);
            prop_assert_eq!(c.class.as_str(), CLASS);
            prop_assert!(c.parts.windows(2).all(|w| w[0].genomic.left <= w[1].genomic.left));
        }
    }

    /// Property: parts are faithful projections of input records
    #[test]
    fn prop_parts_project_records(records in arb_records("r", 0, 20_000, 2..40)) {
        let by_name: HashMap<&str, &Record> = records.iter().map(|r| (r.name.as_str(), r)).collect();
        for c in stitch(&as_block(&records), &GeometricCost::default()) {
            for part in &c.parts {
                let source = by_name[part.name.as_str()];
                prop_assert_eq!(&part.genomic, &source.genomic);
                prop_assert_eq!(part.consensus_left, source.consensus_left);
                prop_assert_eq!(part.consensus_right, source.consensus_right);
            }
        }
    }

    /// Property: chaining the same block twice gives identical output
    #[test]
    fn prop_stitch_deterministic(records in arb_records("r", 0, 20_000, 2..40)) {
        let block = as_block(&records);
        let cost = GeometricCost::default();
        prop_assert_eq!(stitch(&block, &cost), stitch(&block, &cost));
    }

    /// Property: relaxation never lowers a record's own score
    #[test]
    fn prop_relax_monotone(records in arb_records("r", 0, 20_000, 1..40)) {
        let block = as_block(&records);
        let table = relax(&block, &GeometricCost::default());
        prop_assert_eq!(table.len(), block.len());
        for (j, link) in table.iter().enumerate() {
            prop_assert!(link.best >= block[j].score);
            prop_assert!(link.predecessor <= j);
        }
    }

    /// Property: consecutive chain members never end more than max_span apart
    #[test]
    fn prop_span_cutoff(records in arb_records("r", 0, 50_000, 2..40), max_span in 100i64..5_000) {
        let composites = stitch(&as_block(&records), &GeometricCost::new(max_span));
        for c in &composites {
            let mut rights: Vec<i64> = c.parts.iter().map(|p| p.genomic.right).collect();
            rights.sort_unstable();
            prop_assert!(rights.windows(2).all(|w| w[1] - w[0] <= max_span));
        }
    }

    /// Property: a block of one record never yields a composite
    #[test]
    fn prop_single_record_block(records in arb_records("r", 0, 20_000, 1..2)) {
        prop_assert!(stitch(&as_block(&records), &GeometricCost::default()).is_empty());
    }
}

// ============================================================================
// Property Tests for Block Separation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: records split by a gap wider than max_separation never co-occur
    #[test]
    fn prop_separation_enforced(
        near in arb_records("a", 0, 10_000, 1..20),
        separation in 100i64..5_000,
        far_seed in arb_records("b", 0, 10_000, 1..20),
    ) {
        let far_start = near.iter().map(|r| r.genomic.right).max().unwrap_or(0) + separation + 1;
        let mut records = near.clone();
        records.extend(far_seed.into_iter().map(|mut r| {
            r.genomic.left += far_start;
            r.genomic.right += far_start;
            r
        }));

        let composites = chain_partition(&key(), &records, separation, &GeometricCost::new(1_000_000));
        for c in &composites {
            let sides: HashSet<char> = c.parts.iter().filter_map(|p| p.name.chars().next()).collect();
            prop_assert_eq!(sides.len(), 1);
        }
    }

    /// Property: every block holds at least two records and blocks cover the sorted partition in order
    #[test]
    fn prop_blocks_are_ordered(records in arb_records("r", 0, 200_000, 2..60), separation in 0i64..20_000) {
        if let Segmentation::Blocks(blocks) = segment(&records, separation) {
            let mut last_right = i64::MIN;
            for block in blocks.iter() {
                prop_assert!(block.len() >= 2);
                prop_assert!(block.windows(2).all(|w| w[1].genomic.right - w[0].genomic.right <= separation));
                prop_assert!(block[0].genomic.right >= last_right);
                last_right = block[block.len() - 1].genomic.right;
            }
        }
    }
}

// ============================================================================
// Worked Examples
// ============================================================================

#[test]
fn test_adjacent_fragments_merge() {
    let records = vec![
        record("AluY".to_string(), 200, 100, 101, 100, 100.0),
        record("AluY".to_string(), 100, 100, 1, 100, 100.0),
    ];
    let composites = chain_partition(&key(), &records, 50_000, &GeometricCost::default());

    assert_eq!(composites.len(), 1);
    let c = &composites[0];
    assert_eq!(c.score, 200.0);
    let spans: Vec<(i64, i64)> = c.parts.iter().map(|p| (p.genomic.left, p.genomic.right)).collect();
    assert_eq!(spans, vec![(100, 200), (200, 300)]);
}

#[test]
fn test_lone_record_is_absent() {
    let records = vec![
        record("a".to_string(), 100, 100, 1, 100, 100.0),
        record("b".to_string(), 200, 100, 101, 100, 100.0),
        record("c".to_string(), 900_000, 100, 0, 100, 100.0),
    ];
    let composites = chain_partition(&key(), &records, 1_000_000, &GeometricCost::default());
    assert_eq!(names(&composites), vec!["a".to_string(), "b".to_string()]);
}
