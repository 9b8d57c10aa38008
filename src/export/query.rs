//! What to export from an index

use crate::transport::PageRequest;

/// Selection and limits for one export run
///
/// `top` caps the number of exported documents. It never changes the page
/// size; the accumulated result is truncated instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// Fields to include (all fields when None)
    pub select: Option<Vec<String>>,
    /// Filter expression
    pub filter: Option<String>,
    /// Maximum number of documents to export
    pub top: Option<usize>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_select(mut self, fields: Vec<String>) -> Self {
        self.select = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    /// Build the request for the page starting at `skip`
    pub fn page(&self, skip: usize, page_size: usize) -> PageRequest {
        PageRequest {
            skip,
            top: page_size,
            select: self.select.clone(),
            filter: self.filter.clone(),
        }
    }

    /// Progress ceiling given the service's document count
    pub fn expected_total(&self, count: u64) -> u64 {
        match self.top {
            Some(top) => count.min(top as u64),
            None => count,
        }
    }
}
