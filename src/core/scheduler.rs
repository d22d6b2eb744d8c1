//! Concurrent chaining of partitions
//!
//! Each partition is one task: segment it into blocks, then chain the
//! blocks one after another. Tasks run on a rayon pool sized to the worker
//! budget, so at most `workers` partitions are in flight. Every finished
//! block is sent to the consumer over a bounded channel; a task blocks on
//! the send until the consumer catches up.
//!
//! The partition map is moved into an `Arc` before dispatch and only read
//! afterwards. Each task holds a clone of the sender, so the channel closes
//! once the last task returns and the consumer's loop ends.
//!
//! A panic inside a task is caught at the task boundary and delivered on
//! the same channel as [`StitchError::TaskFailed`].

use crate::core::assemble::{self, Assembly};
use crate::core::block::{segment, Segmentation};
use crate::core::stitch::stitch;
use crate::core::{
    Composite, CostModel, GeometricCost, PartitionKey, PartitionMap, Record, Result, StitchConfig,
    StitchError,
};
use crossbeam_channel::{Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Composites from one block of one partition
#[derive(Debug, Clone)]
pub struct BlockBatch {
    pub partition: PartitionKey,
    pub composites: Vec<Composite>,
}

/// Message carried on the result channel
pub type TaskMessage = std::result::Result<BlockBatch, StitchError>;

/// Chain every partition with the geometric cost model and assemble the output
pub fn stitch_all(partitions: PartitionMap, config: &StitchConfig) -> Result<Assembly> {
    run(partitions, config, GeometricCost::new(config.max_span))
}

/// Chain every partition with `cost` and assemble the output
pub fn run<C>(partitions: PartitionMap, config: &StitchConfig, cost: C) -> Result<Assembly>
where
    C: CostModel + Send + Sync + 'static,
{
    config.validate()?;
    let workers = config.effective_workers();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("stitch-{}", i))
        .build()?;

    let receiver = dispatch(
        &pool,
        Arc::new(partitions),
        config.max_separation,
        Arc::new(cost),
        workers,
    );
    let assembly = assemble::collect(receiver);
    log::info!("chaining complete.");
    Ok(assembly)
}

/// Spawn one task per non-empty partition on `pool` and return the result stream.
///
/// The stream ends when every task has finished.
pub fn dispatch<C>(
    pool: &rayon::ThreadPool,
    partitions: Arc<PartitionMap>,
    max_separation: i64,
    cost: Arc<C>,
    capacity: usize,
) -> Receiver<TaskMessage>
where
    C: CostModel + Send + Sync + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));

    let mut keys: Vec<PartitionKey> = partitions
        .iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(key, _)| key.clone())
        .collect();
    keys.sort();

    for key in keys {
        let sender = sender.clone();
        let partitions = Arc::clone(&partitions);
        let cost = Arc::clone(&cost);
        pool.spawn(move || {
            let records = &partitions[&key];
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_task(&key, records, max_separation, cost.as_ref(), &sender)
            }));
            if let Err(payload) = outcome {
                let failure = StitchError::TaskFailed {
                    partition: key.to_string(),
                    message: panic_message(payload.as_ref()),
                };
                // Receiver gone means nobody is left to report to.
                let _ = sender.send(Err(failure));
            }
        });
    }

    receiver
}

fn run_task<C>(
    key: &PartitionKey,
    records: &[Record],
    max_separation: i64,
    cost: &C,
    sender: &Sender<TaskMessage>,
) where
    C: CostModel + ?Sized,
{
    for_each_block(key, records, max_separation, cost, |composites| {
        sender
            .send(Ok(BlockBatch {
                partition: key.clone(),
                composites,
            }))
            .is_ok()
    });
}

/// Chain a single partition on the calling thread
pub fn chain_partition<C>(
    key: &PartitionKey,
    records: &[Record],
    max_separation: i64,
    cost: &C,
) -> Vec<Composite>
where
    C: CostModel + ?Sized,
{
    let mut all = Vec::new();
    for_each_block(key, records, max_separation, cost, |composites| {
        all.extend(composites);
        true
    });
    all
}

/// Segment a partition and hand each block's composites to `emit`,
/// stopping early if `emit` returns false.
fn for_each_block<C, F>(
    key: &PartitionKey,
    records: &[Record],
    max_separation: i64,
    cost: &C,
    mut emit: F,
) where
    C: CostModel + ?Sized,
    F: FnMut(Vec<Composite>) -> bool,
{
    let blocks = match segment(records, max_separation) {
        Segmentation::Skip(reason) => {
            log::info!("{} records={} - skip ({})", key, records.len(), reason);
            return;
        }
        Segmentation::Blocks(blocks) => blocks,
    };
    log::info!(
        "{} records={} blocks={} splits={}",
        key,
        records.len(),
        blocks.len(),
        blocks.splits()
    );

    for block in blocks.iter() {
        log::debug!("{} block size: {}", key, block.len());
        if !emit(stitch(block, cost)) {
            return;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{partition, Genomic, Strand};

    fn rec(class: &str, left: i64, right: i64, cl: i64, cr: i64) -> Record {
        Record::new(
            "rep",
            class,
            50.0,
            Genomic::new("chr1", left, right, Strand::Plus),
            Some(cl),
            Some(cr),
        )
    }

    fn records() -> Vec<Record> {
        vec![
            rec("SINE/Alu", 100, 200, 0, 100),
            rec("SINE/Alu", 200, 300, 100, 200),
            rec("LINE/L1", 1000, 1500, 0, 500),
            rec("LINE/L1", 1500, 2000, 500, 1000),
            rec("LTR/ERVL", 5000, 5100, 0, 100),
        ]
    }

    #[test]
    fn test_stitch_all_single_worker() {
        let config = StitchConfig::default().with_workers(1);
        let assembly = stitch_all(partition(records()), &config).unwrap();
        assert!(assembly.failures.is_empty());
        assert_eq!(assembly.composites.len(), 2);
        assert_eq!(assembly.composites[0].class, "SINE/Alu");
        assert_eq!(assembly.composites[1].class, "LINE/L1");
    }

    #[test]
    fn test_panicking_partition_is_reported() {
        let cost = |l: &Record, _: &Record| -> Option<f64> {
            if l.class == "LINE/L1" {
                panic!("bad partition");
            }
            Some(l.score)
        };
        let config = StitchConfig::default().with_workers(2);
        let assembly = run(partition(records()), &config, cost).unwrap();

        assert_eq!(assembly.failures.len(), 1);
        match &assembly.failures[0] {
            StitchError::TaskFailed { partition, message } => {
                assert!(partition.contains("LINE/L1"));
                assert_eq!(message, "bad partition");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(assembly.composites.len(), 1);
        assert_eq!(assembly.composites[0].class, "SINE/Alu");
    }

    #[test]
    fn test_chain_partition_matches_scheduler() {
        let map = partition(records());
        let cost = GeometricCost::default();
        let mut direct: Vec<Composite> = map
            .iter()
            .flat_map(|(key, recs)| chain_partition(key, recs, 50_000, &cost))
            .collect();
        assemble::sort_composites(&mut direct);

        let assembly = stitch_all(map, &StitchConfig::default().with_workers(4)).unwrap();
        assert_eq!(direct, assembly.composites);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "task panicked");
    }
}
