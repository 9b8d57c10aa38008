//! Transport abstractions for talking to a search index
//!
//! The export and import loops only see these traits. [`rest::SearchClient`]
//! implements both against the Azure AI Search REST API; tests use in-memory
//! implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::snapshot::Record;

pub mod rest;
#[cfg(test)]
pub(crate) mod testing;

pub use rest::{IndexTarget, SearchClient};

/// One page request against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of matching documents to skip
    pub skip: usize,
    /// Maximum number of documents to return
    pub top: usize,
    /// Fields to return (all fields when None)
    pub select: Option<Vec<String>>,
    /// Filter expression
    pub filter: Option<String>,
}

/// One page of search results
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Documents in server order, exactly as returned
    pub records: Vec<Record>,
}

/// How uploaded documents interact with existing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Insert, or overwrite an existing document with the same key
    #[default]
    Replace,
    /// Insert, or merge fields into an existing document with the same key
    Merge,
}

impl WriteMode {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge { WriteMode::Merge } else { WriteMode::Replace }
    }

    /// Indexing action name sent to the service
    pub fn action(&self) -> &'static str {
        match self {
            WriteMode::Replace => "upload",
            WriteMode::Merge => "mergeOrUpload",
        }
    }
}

/// Result of indexing one uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingOutcome {
    /// Document key, when reported
    pub key: Option<String>,
    /// Whether the document was indexed
    pub succeeded: bool,
    /// Rejection reason for failed documents
    pub error_message: Option<String>,
}

impl IndexingOutcome {
    pub fn success(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            succeeded: true,
            error_message: None,
        }
    }

    pub fn rejected(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            succeeded: false,
            error_message: Some(message.into()),
        }
    }
}

/// Read side of an index
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Count documents matching `filter` without fetching them
    async fn count(&self, filter: Option<&str>) -> Result<u64>;

    /// Fetch one page of documents
    async fn search(&self, request: &PageRequest) -> Result<Page>;
}

/// Write side of an index
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Upload a batch, returning one outcome per record in input order
    ///
    /// An `Err` means the call as a whole failed and nothing is known about
    /// individual records.
    async fn upload(&self, records: &[Record], mode: WriteMode) -> Result<Vec<IndexingOutcome>>;
}
