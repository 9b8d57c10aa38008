//! Export an index into a snapshot file
//!
//! The export runs in three steps:
//!
//! 1. **Count probe**: a zero-result query learns the document total for
//!    progress display
//! 2. **Pagination**: [`ExportCoordinator`] pages through the index and
//!    accumulates every document in memory
//! 3. **Write**: the accumulated documents are written once with
//!    [`SnapshotWriter`]
//!
//! A transport error in steps 1-2 aborts the export before anything is
//! written, so a failed run never leaves a partial snapshot behind.
//!
//! # Example
//!
//! ```no_run
//! use search_snapshot::config::Config;
//! use search_snapshot::export::{ExportOptions, QuerySpec, run_export};
//! use search_snapshot::transport::IndexTarget;
//!
//! # async fn example() {
//! let target = IndexTarget {
//!     service: "contoso".to_string(),
//!     index: "hotels".to_string(),
//!     api_key: "<admin key>".to_string(),
//! };
//! let options = ExportOptions::new("hotels.json", QuerySpec::new().with_top(500));
//! let exported = run_export(&target, &Config::default(), &options).await;
//! println!("{exported} documents");
//! # }
//! ```

use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};

use crate::config::{Config, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::progress;
use crate::snapshot::SnapshotWriter;
use crate::transport::{DocumentSource, IndexTarget, SearchClient};

pub mod coordinator;
pub mod query;

pub use coordinator::{CollectedPages, ExportCoordinator};
pub use query::QuerySpec;

/// Parameters of one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Snapshot file to write
    pub output: PathBuf,
    /// What to export
    pub query: QuerySpec,
    /// Documents requested per page
    pub page_size: usize,
    /// Show progress while paging
    pub show_progress: bool,
}

impl ExportOptions {
    pub fn new(output: impl Into<PathBuf>, query: QuerySpec) -> Self {
        Self {
            output: output.into(),
            query,
            page_size: MAX_PAGE_SIZE,
            show_progress: true,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of documents exported
    pub documents_exported: u64,
    /// Number of page requests issued
    pub pages: usize,
    /// Snapshot size in bytes
    pub file_size_bytes: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Export `index_name` from `source` into the snapshot file
///
/// # Returns
/// * `Result<ExportResult>` - Export statistics or the error that aborted the run
pub async fn export_to_file(
    source: &dyn DocumentSource,
    index_name: &str,
    options: &ExportOptions,
) -> Result<ExportResult> {
    let start_time = Instant::now();
    let writer = SnapshotWriter::new(&options.output)?;
    let coordinator = ExportCoordinator::new(source, options.query.clone(), options.page_size);

    let total = coordinator.expected_total().await?;
    println!("Found {} documents in index '{}'", total, index_name);

    info!("Starting export of index '{}'", index_name);
    let reporter = progress::reporter(Some(total), options.show_progress, "Exported");
    let collected = coordinator.collect(reporter.as_ref(), Some(total)).await;
    reporter.finish();
    let collected = collected?;

    let file_size_bytes = writer.write(&collected.records).await?;
    let documents_exported = collected.records.len() as u64;
    println!(
        "Successfully exported {} documents to {}",
        documents_exported,
        options.output.display()
    );

    let elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Export completed: {} documents, {} pages, {} bytes, {} ms",
        documents_exported, collected.pages, file_size_bytes, elapsed_ms
    );

    Ok(ExportResult {
        documents_exported,
        pages: collected.pages,
        file_size_bytes,
        elapsed_ms,
    })
}

/// Export an index to a snapshot file, reporting errors instead of returning them
///
/// Any failure (client setup, transport, file write) is logged and printed,
/// and the run reports zero exported documents.
///
/// # Returns
/// * `u64` - Number of documents exported
pub async fn run_export(target: &IndexTarget, config: &Config, options: &ExportOptions) -> u64 {
    let result = match SearchClient::new(target, &config.service) {
        Ok(client) => export_to_file(&client, &target.index, options).await,
        Err(e) => Err(e),
    };
    report_outcome(result)
}

fn report_outcome(result: Result<ExportResult>) -> u64 {
    match result {
        Ok(result) => result.documents_exported,
        Err(e) => {
            error!("Export failed: {}", e);
            println!("Error exporting documents: {}", e);
            0
        }
    }
}
