// src/services/trigger.rs

//! Recrawl job triggering.
//!
//! A publish notification cannot be applied to the index directly; instead a
//! full crawl of the environment is requested from the build server with a
//! single parameterized GET.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::LOCATION;
use serde::Serialize;
use url::Url;

use crate::error::Result;
use crate::models::{HttpConfig, SyncConfig};
use crate::utils::http::create_async_client;

pub const TOKEN_PARAM: &str = "token";
pub const COMMAND_PARAM: &str = "command";
pub const REPOSITORY_PARAM: &str = "repository";
pub const CLASSIFIER_PARAM: &str = "classifier";
pub const VERSION_PARAM: &str = "version";
pub const ENVIRONMENT_PARAM: &str = "environment";

/// Status reported for an accepted trigger.
pub const ACCEPTED_STATUS: u16 = 202;

/// Status reported when the job could not be reached.
pub const FAILURE_STATUS: u16 = 500;

/// Outcome of a trigger attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTriggerResult {
    pub accepted: bool,
    pub http_status: u16,
    /// Queue location reported by the job runner (empty when it sent none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobTriggerResult {
    fn accepted(location: Option<String>) -> Self {
        Self {
            accepted: true,
            http_status: ACCEPTED_STATUS,
            location_url: Some(location.unwrap_or_default()),
            error: None,
        }
    }

    fn rejected(status: u16) -> Self {
        Self {
            accepted: false,
            http_status: status,
            location_url: None,
            error: None,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            accepted: false,
            http_status: FAILURE_STATUS,
            location_url: None,
            error: Some(error.to_string()),
        }
    }
}

/// Something that can start a recrawl of an environment.
#[async_trait]
pub trait CrawlTrigger: Send + Sync {
    async fn trigger(&self, environment: &str) -> JobTriggerResult;
}

/// Triggers the crawl job over HTTP.
#[derive(Debug, Clone)]
pub struct JobTrigger {
    client: Client,
    config: SyncConfig,
}

impl JobTrigger {
    pub fn new(config: SyncConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(http)?,
            config,
        })
    }

    /// Job URL carrying every parameter for `environment`.
    ///
    /// Environments without job settings use the global repository.
    pub fn build_url(&self, environment: &str) -> Result<Url> {
        let job = self.config.environments.get(environment);
        let repository = job
            .and_then(|job| job.repository.as_deref())
            .unwrap_or(&self.config.repository);

        let mut params = vec![
            (TOKEN_PARAM, self.config.token.as_str()),
            (COMMAND_PARAM, self.config.command.as_str()),
            (REPOSITORY_PARAM, repository),
        ];
        if let Some(classifier) = job.and_then(|job| job.classifier.as_deref()) {
            params.push((CLASSIFIER_PARAM, classifier));
        }
        if let Some(version) = job.and_then(|job| job.version.as_deref()) {
            params.push((VERSION_PARAM, version));
        }
        params.push((ENVIRONMENT_PARAM, environment));

        Ok(Url::parse_with_params(&self.config.job_url, &params)?)
    }

    /// Issue the trigger call. Never retried.
    pub async fn execute(&self, environment: &str) -> JobTriggerResult {
        let url = match self.build_url(environment) {
            Ok(url) => url,
            Err(e) => {
                log::error!("Cannot build job URL for {}: {}", environment, e);
                return JobTriggerResult::failed(e);
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Crawl job request for {} failed: {}", environment, e);
                return JobTriggerResult::failed(e);
            }
        };

        let status = response.status();
        if status.is_informational() || status.is_success() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            log::info!(
                "Crawl of {} accepted ({}), queued at {}",
                environment,
                status,
                location.as_deref().unwrap_or("-")
            );
            JobTriggerResult::accepted(location)
        } else {
            log::warn!("Crawl job for {} answered {}", environment, status);
            JobTriggerResult::rejected(status.as_u16())
        }
    }
}

#[async_trait]
impl CrawlTrigger for JobTrigger {
    async fn trigger(&self, environment: &str) -> JobTriggerResult {
        self.execute(environment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobEnvironment;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JOB_PATH: &str = "/job/run-content-crawler/buildWithParameters";

    fn sync_config(job_url: String) -> SyncConfig {
        let mut config = SyncConfig {
            job_url,
            token: "s3cret".to_string(),
            ..SyncConfig::default()
        };
        config.environments.insert(
            "prod".to_string(),
            JobEnvironment {
                repository: Some("releases".to_string()),
                classifier: Some("prod".to_string()),
                version: Some("1.2.0".to_string()),
            },
        );
        config
    }

    fn trigger_for(server: &MockServer) -> JobTrigger {
        let config = sync_config(format!("{}{}", server.uri(), JOB_PATH));
        JobTrigger::new(config, &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_build_url_with_environment_settings() {
        let trigger = JobTrigger::new(
            sync_config("https://builds.example.org/job/x/buildWithParameters".to_string()),
            &HttpConfig::default(),
        )
        .unwrap();

        let url = trigger.build_url("prod").unwrap();
        assert_eq!(
            url.as_str(),
            "https://builds.example.org/job/x/buildWithParameters\
             ?token=s3cret&command=contentful-crawl&repository=releases\
             &classifier=prod&version=1.2.0&environment=prod"
        );
    }

    #[test]
    fn test_build_url_falls_back_to_global_repository() {
        let trigger = JobTrigger::new(
            sync_config("https://builds.example.org/job".to_string()),
            &HttpConfig::default(),
        )
        .unwrap();

        let url = trigger.build_url("uat").unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("repository".to_string(), "snapshots".to_string())));
        assert!(params.contains(&("environment".to_string(), "uat".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "classifier" || k == "version"));
    }

    #[test]
    fn test_build_url_rejects_bad_job_url() {
        let trigger =
            JobTrigger::new(sync_config("not a url".to_string()), &HttpConfig::default()).unwrap();
        assert!(trigger.build_url("dev").is_err());
    }

    #[tokio::test]
    async fn test_accepted_with_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .and(query_param("token", "s3cret"))
            .and(query_param("environment", "prod"))
            .and(query_param("repository", "releases"))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", "http://jobs/123/"))
            .expect(1)
            .mount(&server)
            .await;

        let result = trigger_for(&server).trigger("prod").await;
        assert_eq!(
            result,
            JobTriggerResult {
                accepted: true,
                http_status: 202,
                location_url: Some("http://jobs/123/".to_string()),
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_accepted_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = trigger_for(&server).trigger("dev").await;
        assert!(result.accepted);
        assert_eq!(result.location_url.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_remote_status_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOB_PATH))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let result = trigger_for(&server).trigger("dev").await;
        assert!(!result.accepted);
        assert_eq!(result.http_status, 403);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_unreachable_job_is_500() {
        let server = MockServer::start().await;
        let config = sync_config(format!("{}{}", server.uri(), JOB_PATH));
        drop(server);

        let result = JobTrigger::new(config, &HttpConfig::default())
            .unwrap()
            .trigger("dev")
            .await;
        assert!(!result.accepted);
        assert_eq!(result.http_status, 500);
        assert!(result.error.is_some());
    }
}
