use std::path::PathBuf;

use futures_util::{stream, StreamExt};
use thiserror::Error;

use collator_core::{BatchState, ItemFailure};
use stage_logging::{stage_debug, stage_info, stage_warn};

use crate::store::{ArtifactStore, StoreError};

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    pub row_count: usize,
    /// File names that did not match the artifact naming convention.
    pub skipped: usize,
    /// Read errors on correctly-named artifacts; per-item, never fatal.
    pub failures: Vec<ItemFailure>,
    pub state: BatchState,
    pub output_path: PathBuf,
}

/// Extract the artifact key from a file name, if the name follows the
/// `<decimal>.txt` convention.
fn ordinal_key(name: &str) -> Option<&str> {
    let key = name.strip_suffix(".txt")?;
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        Some(key)
    } else {
        None
    }
}

/// I/O-bound consumer: fans concurrent readers over the store and feeds one
/// serial writer producing the combined CSV output.
///
/// Aggregation scopes to whatever is present on disk, not to a run's item
/// ids: point each run at a fresh directory if foreign artifacts matter.
pub struct Aggregator {
    readers: usize,
    result_filename: String,
}

impl Aggregator {
    pub fn new(readers: usize, result_filename: impl Into<String>) -> Self {
        Self {
            readers,
            result_filename: result_filename.into(),
        }
    }

    /// Collect every conforming artifact into `<store>/<result_filename>`.
    ///
    /// Rows are written in completion order, not sorted by key. An empty
    /// store yields a valid output with zero data rows.
    pub async fn run(&self, store: &ArtifactStore) -> Result<AggregateSummary, AggregateError> {
        let names = store.list_names()?;

        let mut matching = Vec::new();
        let mut skipped = 0usize;
        for name in names {
            match ordinal_key(&name) {
                Some(key) => matching.push((key.to_string(), name)),
                None => {
                    stage_debug!("aggregation: skipping non-artifact file {name}");
                    skipped += 1;
                }
            }
        }

        stage_info!(
            "aggregation: reading {} artifacts with {} readers",
            matching.len(),
            self.readers
        );

        let results: Vec<(String, Result<Vec<u8>, std::io::Error>)> = stream::iter(matching)
            .map(|(key, name)| {
                let path = store.path_for(&name);
                async move {
                    let value = tokio::fs::read(path).await;
                    (key, value)
                }
            })
            .buffer_unordered(self.readers)
            .collect()
            .await;

        // Single serial writer: one row per pair, in completion order.
        let mut buffer = String::new();
        let mut failures = Vec::new();
        let mut row_count = 0usize;
        for (key, result) in results {
            match result {
                Ok(bytes) => {
                    let value = String::from_utf8_lossy(&bytes);
                    buffer.push_str(&key);
                    buffer.push(',');
                    buffer.push_str(value.trim());
                    buffer.push('\n');
                    row_count += 1;
                }
                Err(err) => {
                    stage_warn!("aggregation: failed to read artifact {key}: {err}");
                    failures.push(ItemFailure {
                        key,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let output_path = store.put(&self.result_filename, buffer.as_bytes())?;
        let state = BatchState::Idle.submit().settle(failures.len());
        stage_info!("aggregation: wrote {row_count} rows to {output_path:?}");

        Ok(AggregateSummary {
            row_count,
            skipped,
            failures,
            state,
            output_path,
        })
    }
}
