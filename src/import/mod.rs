//! Import a snapshot file into an index
//!
//! The snapshot is read whole, then [`ImportCoordinator`] uploads it in
//! fixed-size batches. Failures are scoped to the batch they happen in:
//! rejected documents and failed upload calls are counted, never retried,
//! and never stop the run.

use std::path::PathBuf;

use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::progress;
use crate::snapshot::read_snapshot;
use crate::transport::{DocumentSink, IndexTarget, SearchClient, WriteMode};

pub mod coordinator;

pub use coordinator::{BatchFailure, ImportCoordinator, ImportResult, partition};

/// Parameters of one import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Snapshot file to read
    pub input: PathBuf,
    /// Records per upload call
    pub batch_size: usize,
    /// Replace or merge existing documents
    pub mode: WriteMode,
    /// Show progress while uploading
    pub show_progress: bool,
}

impl ImportOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            batch_size: 1000,
            mode: WriteMode::Replace,
            show_progress: true,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Import the snapshot file into `index_name` through `sink`
///
/// # Returns
/// * `Result<ImportResult>` - Per-run totals, or the error that prevented the
///   upload loop from starting
pub async fn import_from_file(
    sink: &dyn DocumentSink,
    index_name: &str,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let coordinator = ImportCoordinator::new(sink, options.batch_size, options.mode)?;

    println!("Loading documents from {}...", options.input.display());
    let records = read_snapshot(&options.input).await?;

    if records.is_empty() {
        println!("No documents found in the input file.");
        return Ok(ImportResult::default());
    }

    println!(
        "Found {} documents to import into index '{}'",
        records.len(),
        index_name
    );

    info!(
        "Starting import into index '{}' ({} mode, batches of {})",
        index_name,
        options.mode.action(),
        options.batch_size
    );
    let reporter = progress::reporter(
        Some(records.len() as u64),
        options.show_progress,
        "Uploaded",
    );
    let result = coordinator.execute(&records, reporter.as_ref()).await;
    reporter.finish();

    println!(
        "Import complete. Successfully imported {} documents.",
        result.succeeded
    );
    if result.failed > 0 {
        println!("Failed to import {} documents.", result.failed);
    }

    info!(
        "Import completed: {} succeeded, {} failed, {} batches ({} failed), {} ms",
        result.succeeded,
        result.failed,
        result.batches,
        result.failed_batches.len(),
        result.elapsed_ms
    );

    Ok(result)
}

/// Import a snapshot file, reporting errors instead of returning them
///
/// Failures that stop the run before or outside the batch loop (client
/// setup, unreadable or malformed snapshot) are logged and printed, and the
/// run reports zero imported documents.
///
/// # Returns
/// * `u64` - Number of documents successfully imported
pub async fn run_import(target: &IndexTarget, config: &Config, options: &ImportOptions) -> u64 {
    let result = match SearchClient::new(target, &config.service) {
        Ok(client) => import_from_file(&client, &target.index, options).await,
        Err(e) => Err(e),
    };
    report_outcome(result)
}

fn report_outcome(result: Result<ImportResult>) -> u64 {
    match result {
        Ok(result) => result.succeeded,
        Err(e) => {
            error!("Import failed: {}", e);
            println!("Error importing documents: {}", e);
            0
        }
    }
}
