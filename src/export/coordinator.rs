//! Export coordinator for draining an index page by page
//!
//! This module drives the offset-paginated search loop. The cursor always
//! advances by the number of documents a page actually returned, so a short
//! page never causes documents to be skipped.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::snapshot::Record;
use crate::transport::DocumentSource;

use super::query::QuerySpec;

/// Offset past which the service starts rejecting `skip` values.
const SKIP_WARNING_THRESHOLD: usize = 100_000;

/// Documents collected by one pagination run
#[derive(Debug, Default)]
pub struct CollectedPages {
    /// Documents in server order
    pub records: Vec<Record>,
    /// Number of page requests issued
    pub pages: usize,
}

/// Coordinator for the pagination loop
///
/// Offset pagination costs the service more for every page further in, so
/// very large exports get slower as they go. A continuation token could
/// replace the offset cursor as long as it still advances by the documents
/// actually returned.
pub struct ExportCoordinator<'a> {
    /// Index being exported
    source: &'a dyn DocumentSource,
    /// Selection, filter and cap
    query: QuerySpec,
    /// Documents requested per page
    page_size: usize,
}

impl<'a> ExportCoordinator<'a> {
    /// Create a new export coordinator
    pub fn new(source: &'a dyn DocumentSource, query: QuerySpec, page_size: usize) -> Self {
        Self {
            source,
            query,
            page_size,
        }
    }

    /// Ask the service how many documents the export will produce
    ///
    /// Only used for progress display.
    pub async fn expected_total(&self) -> Result<u64> {
        let count = self.source.count(self.query.filter.as_deref()).await?;
        debug!("Count probe returned {} documents", count);
        Ok(self.query.expected_total(count))
    }

    /// Fetch every matching document
    ///
    /// Stops after a page that is empty, that brings the result up to `top`
    /// (the result is truncated to exactly `top`), or that is shorter than the
    /// page size. Any transport error aborts the run.
    ///
    /// # Arguments
    /// * `reporter` - Receives the running document count after every page
    /// * `total` - Progress ceiling, if known
    pub async fn collect(
        &self,
        reporter: &dyn ProgressReporter,
        total: Option<u64>,
    ) -> Result<CollectedPages> {
        let mut records: Vec<Record> = Vec::new();
        let mut cursor = 0usize;
        let mut pages = 0usize;
        let mut warned_skip = false;

        loop {
            if cursor > SKIP_WARNING_THRESHOLD && !warned_skip {
                warn!(
                    "Offset {} exceeds {}; the service may reject further pages",
                    cursor, SKIP_WARNING_THRESHOLD
                );
                warned_skip = true;
            }

            debug!("Fetching page #{} (skip {})", pages + 1, cursor);
            let page = self
                .source
                .search(&self.query.page(cursor, self.page_size))
                .await?;
            pages += 1;

            let returned = page.records.len();
            if returned == 0 {
                debug!("Empty page, no more documents available");
                break;
            }

            records.extend(page.records);
            cursor += returned;

            let reached_top = match self.query.top {
                Some(top) if records.len() >= top => {
                    records.truncate(top);
                    true
                }
                _ => false,
            };

            reporter.report(records.len() as u64, total);

            if pages % 10 == 0 {
                info!(
                    "Progress: {} documents exported ({} pages)",
                    records.len(),
                    pages
                );
            }

            if reached_top {
                debug!("Reached top of {} documents", records.len());
                break;
            }

            if returned < self.page_size {
                debug!("Short page of {} documents, end of results", returned);
                break;
            }
        }

        Ok(CollectedPages { records, pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use crate::progress::RecordingReporter;
    use crate::transport::testing::MockSource;

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r["n"].as_u64().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_three_pages_for_2500_documents() {
        let source = MockSource::with_docs(2500);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 1000);
        let reporter = RecordingReporter::default();

        let total = coordinator.expected_total().await.unwrap();
        let collected = coordinator.collect(&reporter, Some(total)).await.unwrap();

        assert_eq!(collected.records.len(), 2500);
        assert_eq!(collected.pages, 3);
        let skips: Vec<usize> = source.requests().iter().map(|r| r.skip).collect();
        assert_eq!(skips, [0, 1000, 2000]);
        assert!(source.requests().iter().all(|r| r.top == 1000));
        assert_eq!(
            reporter.updates(),
            [(1000, Some(2500)), (2000, Some(2500)), (2500, Some(2500))]
        );
        assert_eq!(ids(&collected.records), (0..2500).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_with_empty_page() {
        let source = MockSource::with_docs(2000);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 1000);

        let collected = coordinator
            .collect(&RecordingReporter::default(), None)
            .await
            .unwrap();

        assert_eq!(collected.records.len(), 2000);
        assert_eq!(collected.pages, 3);
        assert_eq!(source.requests()[2].skip, 2000);
    }

    #[tokio::test]
    async fn test_top_truncates_to_first_documents() {
        let source = MockSource::with_docs(2500);
        let query = QuerySpec::new().with_top(1500);
        let coordinator = ExportCoordinator::new(&source, query, 1000);
        let reporter = RecordingReporter::default();

        let total = coordinator.expected_total().await.unwrap();
        assert_eq!(total, 1500);
        let collected = coordinator.collect(&reporter, Some(total)).await.unwrap();

        assert_eq!(ids(&collected.records), (0..1500).collect::<Vec<u64>>());
        assert_eq!(collected.pages, 2);
        // Page size is not shrunk to fit top.
        assert_eq!(source.requests()[1].top, 1000);
        // Progress never passes the ceiling.
        assert!(reporter.updates().iter().all(|(n, _)| *n <= 1500));
    }

    #[tokio::test]
    async fn test_top_larger_than_collection() {
        let source = MockSource::with_docs(30);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new().with_top(100), 10);

        let collected = coordinator
            .collect(&RecordingReporter::default(), None)
            .await
            .unwrap();

        assert_eq!(collected.records.len(), 30);
        assert_eq!(collected.pages, 4);
    }

    #[tokio::test]
    async fn test_cursor_advances_by_returned_count() {
        let source = MockSource::with_docs(2500);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 250);

        let collected = coordinator
            .collect(&RecordingReporter::default(), None)
            .await
            .unwrap();

        assert_eq!(ids(&collected.records), (0..2500).collect::<Vec<u64>>());
        let skips: Vec<usize> = source.requests().iter().map(|r| r.skip).collect();
        assert_eq!(skips, (0..=2500).step_by(250).collect::<Vec<usize>>());
    }

    #[tokio::test]
    async fn test_short_page_stops_loop() {
        let source = MockSource::with_docs(2500).capped(300);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 1000);

        let collected = coordinator
            .collect(&RecordingReporter::default(), None)
            .await
            .unwrap();

        assert_eq!(collected.records.len(), 300);
        assert_eq!(collected.pages, 1);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let source = MockSource::with_docs(0);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 1000);
        let reporter = RecordingReporter::default();

        let collected = coordinator.collect(&reporter, Some(0)).await.unwrap();

        assert!(collected.records.is_empty());
        assert_eq!(collected.pages, 1);
        assert!(reporter.updates().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_aborts() {
        let source = MockSource::with_docs(2500).failing_on(1);
        let coordinator = ExportCoordinator::new(&source, QuerySpec::new(), 1000);

        let err = coordinator
            .collect(&RecordingReporter::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SnapshotError::Transport(_)));
        assert_eq!(source.requests().len(), 2);
    }
}
