//! Search index abstractions.
//!
//! The search engine is consumed through the [`SearchIndex`] trait:
//! - `elastic`: REST implementation for Elasticsearch (`ElasticClient`)
//! - `registry`: per-environment client resolution (`EnvironmentClientRegistry`)

pub mod elastic;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{EnvironmentConfig, RawDocument};

pub use elastic::{ElasticClient, ElasticClientFactory};
pub use registry::EnvironmentClientRegistry;

/// Page size when a request does not set one.
pub const DEFAULT_SIZE: usize = 10;

/// Upper bound on any page size.
pub const MAX_SIZE: usize = 1_000;

/// Only documents flagged searchable are ever served.
const SEARCHABLE_FIELD: &str = "searchable";

/// Result of a delete-by-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// HTTP status reported by the search engine
    pub status: u16,
    /// Whether a document was actually removed
    pub found: bool,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub source: RawDocument,
}

/// A filtered, date-sorted query against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    /// Exact-match filters
    pub terms: Vec<(String, Value)>,
    /// Restrict to documents whose field is today or later
    pub upcoming_field: Option<String>,
    /// Date field sorted newest first
    pub sort_field: String,
    pub size: usize,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>, sort_field: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            terms: Vec::new(),
            upcoming_field: None,
            sort_field: sort_field.into(),
            size: DEFAULT_SIZE,
        }
    }

    pub fn term(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    pub fn upcoming(mut self, field: impl Into<String>) -> Self {
        self.upcoming_field = Some(field.into());
        self
    }

    /// Set the page size, clamped to [`MAX_SIZE`].
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.size = limit.unwrap_or(DEFAULT_SIZE).min(MAX_SIZE);
        self
    }

    /// Request body in Elasticsearch query DSL.
    pub fn to_query(&self) -> Value {
        let mut filters = vec![json!({ "term": { SEARCHABLE_FIELD: true } })];
        filters.extend(
            self.terms
                .iter()
                .map(|(field, value)| json!({ "term": { field: value } })),
        );
        if let Some(field) = &self.upcoming_field {
            filters.push(json!({ "range": { field: { "gte": "now/d" } } }));
        }

        json!({
            "query": {
                "bool": {
                    "must": [{ "match_all": {} }],
                    "filter": filters,
                }
            },
            "sort": [{ &self.sort_field: { "order": "desc" } }],
            "size": self.size,
        })
    }
}

/// Query/get/delete access to a search cluster.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Delete a document by id. A missing document is reported through
    /// [`DeleteOutcome::found`], not as an error.
    async fn delete(&self, index: &str, id: &str) -> Result<DeleteOutcome>;

    /// Fetch a document source by id.
    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>>;

    /// Run a query.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}

/// Opens search clients for connection settings.
pub trait ClientFactory {
    fn open(&self, config: &EnvironmentConfig) -> Result<Arc<dyn SearchIndex>>;
}
