//! Azure AI Search REST client
//!
//! Implements [`DocumentSource`] and [`DocumentSink`] over the service's
//! documents API:
//! - `POST /indexes/{index}/docs/search` for counting and paging
//! - `POST /indexes/{index}/docs/index` for batch uploads

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ServiceConfig;
use crate::error::{Result, TransportError, extract_error_info};
use crate::snapshot::Record;

use super::{DocumentSink, DocumentSource, IndexingOutcome, Page, PageRequest, WriteMode};

/// Upper bound on how much of an unparseable error body is kept.
const MAX_ERROR_BODY: usize = 512;

/// Which index to talk to and how to authenticate
#[derive(Clone)]
pub struct IndexTarget {
    /// Search service name, e.g. `contoso` for `contoso.search.windows.net`
    pub service: String,
    /// Index name
    pub index: String,
    /// Admin or query API key
    pub api_key: String,
}

impl fmt::Debug for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTarget")
            .field("service", &self.service)
            .field("index", &self.index)
            .field("api_key", &"***")
            .finish()
    }
}

/// HTTP client bound to one index
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
    api_key: String,
    api_version: String,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    search: &'a str,
    count: bool,
    skip: usize,
    top: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    select: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "@odata.count", default)]
    count: Option<u64>,
    #[serde(default)]
    value: Vec<Record>,
}

#[derive(Serialize)]
struct IndexBatch {
    value: Vec<Record>,
}

#[derive(Deserialize)]
struct IndexResponse {
    #[serde(default)]
    value: Vec<IndexResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexResult {
    key: Option<String>,
    #[serde(default)]
    status: bool,
    error_message: Option<String>,
}

impl SearchClient {
    /// Create a client for `target` using the service settings from config
    ///
    /// # Returns
    /// * `Result<Self>` - Client or configuration/transport error
    pub fn new(target: &IndexTarget, config: &ServiceConfig) -> Result<Self> {
        config.validate_endpoint()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("search-snapshot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = config.base_url(&target.service);
        debug!("Search client for index '{}' at {}", target.index, base_url);

        Ok(Self {
            http,
            base_url,
            index: target.index.clone(),
            api_key: target.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn docs_url(&self, operation: &str) -> String {
        format!("{}/indexes/{}/docs/{}", self.base_url, self.index, operation)
    }

    async fn post<B, R>(&self, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.docs_url(operation);
        trace!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let info = extract_error_info(&text);
            let body = if info.is_some() {
                String::new()
            } else {
                text.chars().take(MAX_ERROR_BODY).collect()
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                info,
                body,
            }
            .into());
        }

        serde_json::from_str(&text)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()).into())
    }

    async fn run_search(&self, body: &SearchBody<'_>) -> Result<SearchResponse> {
        self.post("search", body).await
    }
}

#[async_trait]
impl DocumentSource for SearchClient {
    async fn count(&self, filter: Option<&str>) -> Result<u64> {
        let body = SearchBody {
            search: "*",
            count: true,
            skip: 0,
            top: 0,
            select: None,
            filter,
        };
        let response = self.run_search(&body).await?;
        response.count.ok_or_else(|| {
            TransportError::InvalidResponse("missing @odata.count in count response".to_string())
                .into()
        })
    }

    async fn search(&self, request: &PageRequest) -> Result<Page> {
        let body = SearchBody {
            search: "*",
            count: true,
            skip: request.skip,
            top: request.top,
            select: request.select.as_ref().map(|fields| fields.join(",")),
            filter: request.filter.as_deref(),
        };
        let response = self.run_search(&body).await?;

        Ok(Page {
            records: response.value,
        })
    }
}

#[async_trait]
impl DocumentSink for SearchClient {
    async fn upload(&self, records: &[Record], mode: WriteMode) -> Result<Vec<IndexingOutcome>> {
        let batch = IndexBatch {
            value: records.iter().map(|r| with_action(r, mode)).collect(),
        };
        let response: IndexResponse = self.post("index", &batch).await?;

        if response.value.len() != records.len() {
            return Err(TransportError::OutcomeMismatch {
                expected: records.len(),
                found: response.value.len(),
            }
            .into());
        }

        Ok(response
            .value
            .into_iter()
            .map(|r| IndexingOutcome {
                key: r.key,
                succeeded: r.status,
                error_message: r.error_message,
            })
            .collect())
    }
}

/// Prepend the indexing action to a copy of `record`.
fn with_action(record: &Record, mode: WriteMode) -> Record {
    let mut action = Record::with_capacity(record.len() + 1);
    action.insert(
        "@search.action".to_string(),
        Value::String(mode.action().to_string()),
    );
    for (key, value) in record {
        if key != "@search.action" {
            action.insert(key.clone(), value.clone());
        }
    }
    action
}
