// src/search/elastic.rs

//! Elasticsearch REST client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{EnvironmentConfig, HttpConfig, RawDocument};
use crate::search::{ClientFactory, DeleteOutcome, SearchHit, SearchIndex, SearchRequest};

/// Search client speaking the Elasticsearch REST API.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: RawDocument,
}

impl ElasticClient {
    /// Create a client for one cluster.
    pub fn new(config: &EnvironmentConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&config.host)?,
        })
    }

    /// `{host}/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("Cannot use {} as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl SearchIndex for ElasticClient {
    async fn delete(&self, index: &str, id: &str) -> Result<DeleteOutcome> {
        let url = self.endpoint(&[index, "_doc", id])?;
        let status = self.client.delete(url).send().await?.status();

        if status == StatusCode::NOT_FOUND {
            log::info!("Document {}/{} already absent", index, id);
        } else if !status.is_success() {
            log::warn!("Delete of {}/{} answered {}", index, id, status);
        }

        Ok(DeleteOutcome {
            status: status.as_u16(),
            found: status.is_success(),
        })
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>> {
        let url = self.endpoint(&[index, "_doc", id])?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: GetResponse = response.json().await?;
                Ok(body.source.filter(|_| body.found))
            }
            status => Err(AppError::search(
                format!("get {index}/{id}"),
                format!("status {status}"),
            )),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let url = self.endpoint(&[request.index.as_str(), "_search"])?;
        let response = self
            .client
            .post(url)
            .json(&request.to_query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::search(
                format!("search {}", request.index),
                format!("status {status}"),
            ));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                id: hit.id,
                source: hit.source,
            })
            .collect())
    }
}

/// Opens [`ElasticClient`]s sharing one set of HTTP settings.
#[derive(Debug, Clone)]
pub struct ElasticClientFactory {
    http: HttpConfig,
}

impl ElasticClientFactory {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }
}

impl ClientFactory for ElasticClientFactory {
    fn open(&self, config: &EnvironmentConfig) -> Result<Arc<dyn SearchIndex>> {
        Ok(Arc::new(ElasticClient::new(config, &self.http)?))
    }
}
