//! In-memory transports for pipeline tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Result, TransportError};
use crate::snapshot::Record;

use super::{DocumentSink, DocumentSource, IndexingOutcome, Page, PageRequest, WriteMode};

/// Records `{"id": "<i>", "n": i}` for `i` in `0..n`.
pub(crate) fn numbered_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({ "id": i.to_string(), "n": i })
                .as_object()
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// Index serving pages from a fixed document list.
pub(crate) struct MockSource {
    docs: Vec<Record>,
    /// Server-side cap on documents per response
    server_cap: Option<usize>,
    /// Zero-based search call that fails
    fail_on: Option<usize>,
    requests: Mutex<Vec<PageRequest>>,
    /// Filter argument of every count call
    count_filters: Mutex<Vec<Option<String>>>,
}

impl MockSource {
    pub(crate) fn with_docs(n: usize) -> Self {
        Self {
            docs: numbered_records(n),
            server_cap: None,
            fail_on: None,
            requests: Mutex::new(Vec::new()),
            count_filters: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn capped(mut self, cap: usize) -> Self {
        self.server_cap = Some(cap);
        self
    }

    pub(crate) fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count_filters(&self) -> Vec<Option<String>> {
        self.count_filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    async fn count(&self, filter: Option<&str>) -> Result<u64> {
        self.count_filters
            .lock()
            .unwrap()
            .push(filter.map(str::to_string));
        Ok(self.docs.len() as u64)
    }

    async fn search(&self, request: &PageRequest) -> Result<Page> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        if self.fail_on == Some(call) {
            return Err(TransportError::Request("connection reset".to_string()).into());
        }

        let take = self.server_cap.map_or(request.top, |cap| cap.min(request.top));
        let records = self
            .docs
            .iter()
            .skip(request.skip)
            .take(take)
            .cloned()
            .collect();
        Ok(Page { records })
    }
}

/// Index accepting uploads, with scripted call failures and rejections.
#[derive(Default)]
pub(crate) struct MockSink {
    /// Zero-based upload calls that fail as a whole
    failing_calls: HashSet<usize>,
    /// Records whose `n` is a multiple of this are rejected
    reject_every: Option<u64>,
    uploads: Mutex<Vec<(Vec<Record>, WriteMode)>>,
}

impl MockSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    pub(crate) fn rejecting_every(mut self, n: u64) -> Self {
        self.reject_every = Some(n);
        self
    }

    pub(crate) fn uploads(&self) -> Vec<(Vec<Record>, WriteMode)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSink for MockSink {
    async fn upload(&self, records: &[Record], mode: WriteMode) -> Result<Vec<IndexingOutcome>> {
        let call = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((records.to_vec(), mode));
            uploads.len() - 1
        };
        if self.failing_calls.contains(&call) {
            return Err(TransportError::Request("network unreachable".to_string()).into());
        }

        Ok(records
            .iter()
            .map(|record| {
                let key = record["id"].as_str().unwrap_or_default().to_string();
                let n = record["n"].as_u64().unwrap_or_default();
                match self.reject_every {
                    Some(every) if n % every == 0 => IndexingOutcome::rejected(key, "invalid document"),
                    _ => IndexingOutcome::success(key),
                }
            })
            .collect())
    }
}
