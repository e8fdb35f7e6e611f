use crossbeam::channel::bounded;
use num_bigint::BigUint;
use thiserror::Error;

use collator_core::{BatchOutcome, ComputeItem};
use stage_logging::{stage_info, stage_warn};

use crate::store::{ArtifactStore, StoreError};

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("compute worker pool panicked")]
    PoolPanic,
}

/// The n-th Fibonacci number, iterative and linear-time.
///
/// Arbitrary precision is required: ordinals in the default range produce
/// values with tens of thousands of decimal digits.
pub fn fib(n: u64) -> BigUint {
    let mut f0 = BigUint::from(0u8);
    let mut f1 = BigUint::from(1u8);
    if n == 0 {
        return f0;
    }
    for _ in 1..n {
        let next = &f0 + &f1;
        f0 = std::mem::replace(&mut f1, next);
    }
    f1
}

fn compute_and_persist(store: &ArtifactStore, item: ComputeItem) -> Result<(), StoreError> {
    let value = fib(item.ordinal);
    store.put(&format!("{}.txt", item.ordinal), value.to_string().as_bytes())?;
    Ok(())
}

/// CPU-bound producer: fans ordinals across a bounded pool of OS threads.
///
/// Workers share no mutable state; each one's only observable side effect is
/// its own artifact write. `run` blocks until the pool has drained, which is
/// the phase barrier the aggregation stage relies on.
pub struct ComputeStage {
    workers: usize,
}

impl ComputeStage {
    /// `workers == 0` sizes the pool to the machine's logical CPU count.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };
        Self { workers }
    }

    /// Compute and persist every item, isolating per-item failures.
    ///
    /// A failed item is recorded in the outcome and never aborts the batch;
    /// the only hard error is a panicking worker.
    pub fn run(
        &self,
        store: &ArtifactStore,
        items: Vec<ComputeItem>,
    ) -> Result<BatchOutcome, ComputeError> {
        let work_count = items.len();
        let mut outcome = BatchOutcome::new(work_count);
        if work_count == 0 {
            stage_info!("compute stage: nothing to do");
            outcome.settle();
            return Ok(outcome);
        }

        let workers = self.workers.min(work_count).max(1);
        stage_info!("compute stage: {work_count} items across {workers} workers");

        let (work_tx, work_rx) = bounded::<ComputeItem>(workers * 2);
        let (result_tx, result_rx) = bounded::<(u64, Result<(), StoreError>)>(workers * 2);

        crossbeam::thread::scope(|s| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move |_| {
                    while let Ok(item) = work_rx.recv() {
                        let result = compute_and_persist(store, item);
                        if result_tx.send((item.ordinal, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(work_rx);
            drop(result_tx);

            // Feed the pool from a dedicated thread so the scope thread can
            // drain results; with both channels bounded, feeding and
            // collecting from the same thread would deadlock.
            s.spawn(move |_| {
                for item in items {
                    if work_tx.send(item).is_err() {
                        break;
                    }
                }
            });

            for _ in 0..work_count {
                match result_rx.recv() {
                    Ok((_, Ok(()))) => outcome.record_success(),
                    Ok((ordinal, Err(err))) => {
                        stage_warn!("compute stage: ordinal {ordinal} failed: {err}");
                        outcome.record_failure(ordinal.to_string(), err.to_string());
                    }
                    Err(_) => break,
                }
            }
        })
        .map_err(|_| ComputeError::PoolPanic)?;

        outcome.settle();
        stage_info!(
            "compute stage: {} succeeded, {} failed",
            outcome.succeeded(),
            outcome.failures().len()
        );
        Ok(outcome)
    }
}
