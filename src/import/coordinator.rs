//! Import coordinator for uploading a snapshot in batches
//!
//! Records are partitioned positionally into contiguous batches and uploaded
//! one batch at a time. Every record ends up counted exactly once, as either
//! succeeded or failed.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::progress::ProgressReporter;
use crate::snapshot::Record;
use crate::transport::{DocumentSink, WriteMode};

/// Rejected documents logged per batch.
const MAX_LOGGED_REJECTIONS: usize = 5;

/// A batch whose upload call failed as a whole
///
/// All of its records are counted as failed even though the service may have
/// indexed some of them before the connection dropped; the actual outcome of
/// these records is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the batch's first record in the snapshot
    pub offset: usize,
    /// Number of records in the batch
    pub size: usize,
    /// Transport error message
    pub message: String,
}

/// Result of an import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Records the service reported as indexed
    pub succeeded: u64,
    /// Records rejected by the service or lost with a failed batch
    pub failed: u64,
    /// Number of batches submitted
    pub batches: usize,
    /// Batches whose upload call failed
    pub failed_batches: Vec<BatchFailure>,
    /// Time taken for import
    pub elapsed_ms: u64,
}

impl ImportResult {
    /// Records accounted for, succeeded or failed
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Split `records` into contiguous batches of at most `batch_size`
///
/// Yields each batch with the position of its first record.
pub fn partition(records: &[Record], batch_size: usize) -> impl Iterator<Item = (usize, &[Record])> {
    records
        .chunks(batch_size)
        .enumerate()
        .map(move |(i, batch)| (i * batch_size, batch))
}

/// Coordinator for the batch upload loop
pub struct ImportCoordinator<'a> {
    /// Index receiving the documents
    sink: &'a dyn DocumentSink,
    /// Records per upload call
    batch_size: usize,
    /// Write mode for the whole run
    mode: WriteMode,
}

impl<'a> ImportCoordinator<'a> {
    /// Create a new import coordinator
    ///
    /// # Returns
    /// * `Result<Self>` - Coordinator, or an error when `batch_size` is zero
    pub fn new(sink: &'a dyn DocumentSink, batch_size: usize, mode: WriteMode) -> Result<Self> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size".to_string(),
                value: batch_size.to_string(),
            }
            .into());
        }
        Ok(Self {
            sink,
            batch_size,
            mode,
        })
    }

    /// Upload every record, batch by batch
    ///
    /// A failed upload call marks its whole batch as failed and the loop moves
    /// on; it never aborts early. An empty input makes no upload calls.
    ///
    /// # Arguments
    /// * `records` - Records in snapshot order
    /// * `reporter` - Receives the running record count after every batch
    pub async fn execute(&self, records: &[Record], reporter: &dyn ProgressReporter) -> ImportResult {
        let start_time = Instant::now();
        let total = records.len() as u64;
        let mut result = ImportResult::default();
        let mut processed = 0u64;

        for (offset, batch) in partition(records, self.batch_size) {
            debug!(
                "Uploading batch #{} ({} documents from {})",
                result.batches + 1,
                batch.len(),
                offset
            );
            result.batches += 1;

            match self.sink.upload(batch, self.mode).await {
                Ok(outcomes) => {
                    let succeeded = outcomes
                        .iter()
                        .take(batch.len())
                        .filter(|o| o.succeeded)
                        .count();
                    result.succeeded += succeeded as u64;
                    result.failed += (batch.len() - succeeded) as u64;

                    for outcome in outcomes
                        .iter()
                        .filter(|o| !o.succeeded)
                        .take(MAX_LOGGED_REJECTIONS)
                    {
                        warn!(
                            "Document '{}' rejected: {}",
                            outcome.key.as_deref().unwrap_or("?"),
                            outcome.error_message.as_deref().unwrap_or("no reason given")
                        );
                    }
                }
                Err(e) => {
                    warn!("Error uploading batch starting at document {}: {}", offset, e);
                    result.failed += batch.len() as u64;
                    result.failed_batches.push(BatchFailure {
                        offset,
                        size: batch.len(),
                        message: e.to_string(),
                    });
                }
            }

            processed += batch.len() as u64;
            reporter.report(processed, Some(total));

            if result.batches % 10 == 0 {
                info!(
                    "Progress: {} documents uploaded ({} batches)",
                    processed, result.batches
                );
            }
        }

        result.elapsed_ms = start_time.elapsed().as_millis() as u64;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingReporter;
    use crate::transport::testing::{MockSink, numbered_records};

    #[tokio::test]
    async fn test_second_batch_network_error() {
        let records = numbered_records(2500);
        let sink = MockSink::new().failing_call(1);
        let coordinator = ImportCoordinator::new(&sink, 1000, WriteMode::Replace).unwrap();
        let reporter = RecordingReporter::default();

        let result = coordinator.execute(&records, &reporter).await;

        assert_eq!(result.succeeded, 1500);
        assert_eq!(result.failed, 1000);
        assert_eq!(result.batches, 3);
        assert_eq!(result.failed_batches.len(), 1);
        assert_eq!(result.failed_batches[0].offset, 1000);
        assert_eq!(result.failed_batches[0].size, 1000);
        assert_eq!(sink.uploads().len(), 3);
        assert_eq!(
            reporter.updates(),
            [(1000, Some(2500)), (2000, Some(2500)), (2500, Some(2500))]
        );
    }

    #[tokio::test]
    async fn test_rejections_are_counted_not_retried() {
        let records = numbered_records(10);
        // n = 0, 3, 6, 9 are rejected
        let sink = MockSink::new().rejecting_every(3);
        let coordinator = ImportCoordinator::new(&sink, 4, WriteMode::Merge).unwrap();

        let result = coordinator
            .execute(&records, &RecordingReporter::default())
            .await;

        assert_eq!(result.succeeded, 6);
        assert_eq!(result.failed, 4);
        assert!(result.failed_batches.is_empty());
        let uploads = sink.uploads();
        assert_eq!(uploads.len(), 3);
        assert!(uploads.iter().all(|(_, mode)| *mode == WriteMode::Merge));
    }

    #[tokio::test]
    async fn test_every_batch_failing_still_accounts_all_records() {
        let records = numbered_records(7);
        let sink = MockSink::new()
            .failing_call(0)
            .failing_call(1)
            .failing_call(2)
            .failing_call(3);
        let coordinator = ImportCoordinator::new(&sink, 2, WriteMode::Replace).unwrap();

        let result = coordinator
            .execute(&records, &RecordingReporter::default())
            .await;

        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 7);
        assert_eq!(result.processed(), 7);
        assert_eq!(result.failed_batches.len(), 4);
        assert_eq!(result.failed_batches[3].size, 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let sink = MockSink::new();
        let coordinator = ImportCoordinator::new(&sink, 1000, WriteMode::Replace).unwrap();
        let reporter = RecordingReporter::default();

        let result = coordinator.execute(&[], &reporter).await;

        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(result.batches, 0);
        assert!(sink.uploads().is_empty());
        assert!(reporter.updates().is_empty());
    }

    #[tokio::test]
    async fn test_batches_preserve_snapshot_order() {
        let records = numbered_records(23);
        let sink = MockSink::new();
        let coordinator = ImportCoordinator::new(&sink, 5, WriteMode::Replace).unwrap();

        coordinator
            .execute(&records, &RecordingReporter::default())
            .await;

        let uploaded: Vec<Record> = sink
            .uploads()
            .into_iter()
            .flat_map(|(batch, _)| batch)
            .collect();
        assert_eq!(uploaded, records);
    }

    #[test]
    fn test_partition_sizes() {
        let records = numbered_records(2500);
        let batches: Vec<(usize, usize)> = partition(&records, 1000)
            .map(|(offset, batch)| (offset, batch.len()))
            .collect();
        assert_eq!(batches, [(0, 1000), (1000, 1000), (2000, 500)]);

        for (size, batch_size) in [(0, 3), (1, 3), (3, 3), (10, 3), (10, 1), (10, 100)] {
            let records = numbered_records(size);
            let batches: Vec<&[Record]> = partition(&records, batch_size).map(|(_, b)| b).collect();
            assert_eq!(batches.len(), size.div_ceil(batch_size));
            let (last, rest) = match batches.split_last() {
                Some(split) => split,
                None => continue,
            };
            assert!(rest.iter().all(|b| b.len() == batch_size));
            assert!(!last.is_empty() && last.len() <= batch_size);
            assert_eq!(batches.concat(), records);
        }
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let sink = MockSink::new();
        assert!(ImportCoordinator::new(&sink, 0, WriteMode::Replace).is_err());
    }
}
