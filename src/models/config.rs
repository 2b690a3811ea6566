//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Environment variable that overrides `sync.token`.
pub const TOKEN_ENV_VAR: &str = "CONTENT_SYNC_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Inbound HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Primary search cluster, used for feeds and as the shared default client
    #[serde(default)]
    pub search: EnvironmentConfig,

    /// Webhook synchronization settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Feed projection settings
    #[serde(default)]
    pub feeds: FeedConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides taken from the process environment.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                self.sync.token = token;
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.sync.token.trim().is_empty() {
            return Err(AppError::validation(format!(
                "sync.token is empty (set it in the config file or via {TOKEN_ENV_VAR})"
            )));
        }
        Url::parse(&self.sync.job_url)
            .map_err(|e| AppError::validation(format!("sync.job_url is invalid: {e}")))?;
        self.search.validate("search")?;
        for (env, index) in &self.sync.indexes {
            index.validate(&format!("sync.indexes.{env}"))?;
        }
        if self.feeds.default_locale.trim().is_empty() {
            return Err(AppError::validation("feeds.default_locale is empty"));
        }
        Ok(())
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
        }
    }
}

/// Connection settings of one search cluster.
///
/// Two environments whose settings compare equal share a single client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Base URL of the cluster's REST endpoint
    #[serde(default = "defaults::search_host")]
    pub host: String,

    /// Cluster name, part of the connection identity
    #[serde(default = "defaults::cluster")]
    pub cluster: String,

    /// TCP connect timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub request_timeout_secs: u64,
}

impl EnvironmentConfig {
    fn validate(&self, section: &str) -> Result<()> {
        Url::parse(&self.host)
            .map_err(|e| AppError::validation(format!("{section}.host is invalid: {e}")))?;
        if self.request_timeout_secs == 0 {
            return Err(AppError::validation(format!(
                "{section}.request_timeout_secs must be > 0"
            )));
        }
        Ok(())
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            host: defaults::search_host(),
            cluster: defaults::cluster(),
            connect_timeout_secs: defaults::connect_timeout(),
            request_timeout_secs: defaults::timeout(),
        }
    }
}

/// Webhook synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// URL of the job that runs a full crawl
    #[serde(default = "defaults::job_url")]
    pub job_url: String,

    /// Shared secret: required from webhook callers and passed to the job
    #[serde(default)]
    pub token: String,

    /// Command parameter of the crawl job
    #[serde(default = "defaults::command")]
    pub command: String,

    /// Artifact repository used when an environment does not override it
    #[serde(default = "defaults::repository")]
    pub repository: String,

    /// Search cluster per environment name
    #[serde(default)]
    pub indexes: HashMap<String, EnvironmentConfig>,

    /// Crawl job parameters per environment name
    #[serde(default)]
    pub environments: HashMap<String, JobEnvironment>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            job_url: defaults::job_url(),
            token: String::new(),
            command: defaults::command(),
            repository: defaults::repository(),
            indexes: HashMap::new(),
            environments: HashMap::new(),
        }
    }
}

/// Crawl job parameters for one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvironment {
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub classifier: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

/// Feed projection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "defaults::news_index")]
    pub news_index: String,

    #[serde(default = "defaults::events_index")]
    pub events_index: String,

    #[serde(default = "defaults::data_use_index")]
    pub data_use_index: String,

    #[serde(default = "defaults::programme_index")]
    pub programme_index: String,

    /// Locale used when a request names none
    #[serde(default = "defaults::default_locale")]
    pub default_locale: String,

    /// Portal URL; entry links default to `{portal_url}{index}/{id}`
    #[serde(default = "defaults::portal_url")]
    pub portal_url: String,
}

impl FeedConfig {
    /// Base link for documents of the given index.
    pub fn base_link(&self, index: &str) -> String {
        format!("{}{}", self.portal_url, index)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            news_index: defaults::news_index(),
            events_index: defaults::events_index(),
            data_use_index: defaults::data_use_index(),
            programme_index: defaults::programme_index(),
            default_locale: defaults::default_locale(),
            portal_url: defaults::portal_url(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("content-sync/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn connect_timeout() -> u64 {
        5
    }
    pub fn bind() -> String {
        "0.0.0.0:8080".into()
    }

    // Search defaults
    pub fn search_host() -> String {
        "http://localhost:9200".into()
    }
    pub fn cluster() -> String {
        "content-cluster".into()
    }

    // Sync defaults
    pub fn job_url() -> String {
        "https://builds.gbif.org/job/run-content-crawler/buildWithParameters".into()
    }
    pub fn command() -> String {
        "contentful-crawl".into()
    }
    pub fn repository() -> String {
        "snapshots".into()
    }

    // Feed defaults
    pub fn news_index() -> String {
        "news".into()
    }
    pub fn events_index() -> String {
        "event".into()
    }
    pub fn data_use_index() -> String {
        "datause".into()
    }
    pub fn programme_index() -> String {
        "programme".into()
    }
    pub fn default_locale() -> String {
        "en-GB".into()
    }
    pub fn portal_url() -> String {
        "http://www.gbif.org/".into()
    }
}
