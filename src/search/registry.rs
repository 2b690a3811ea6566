// src/search/registry.rs

//! Per-environment search client resolution.
//!
//! The registry is assembled once at startup. Environments whose connection
//! settings equal the primary cluster's reuse the already-open default
//! client, and every other distinct setting gets exactly one new client, no
//! matter how many environment names point at it. After construction the
//! registry is read-only.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::EnvironmentConfig;
use crate::search::{ClientFactory, SearchIndex};

/// Environment name → search client.
pub struct EnvironmentClientRegistry {
    clients: HashMap<String, Arc<dyn SearchIndex>>,
    default_client: Arc<dyn SearchIndex>,
}

impl EnvironmentClientRegistry {
    /// Assign a client to every configured environment.
    pub fn build(
        environments: &HashMap<String, EnvironmentConfig>,
        primary: &EnvironmentConfig,
        default_client: Arc<dyn SearchIndex>,
        factory: &dyn ClientFactory,
    ) -> Result<Self> {
        let mut opened: HashMap<&EnvironmentConfig, Arc<dyn SearchIndex>> = HashMap::new();
        opened.insert(primary, Arc::clone(&default_client));

        let mut clients = HashMap::with_capacity(environments.len());
        for (name, config) in environments {
            let client = match opened.get(config) {
                Some(client) => Arc::clone(client),
                None => {
                    log::info!(
                        "Opening search client for {} ({}, cluster {})",
                        name,
                        config.host,
                        config.cluster
                    );
                    let client = factory.open(config)?;
                    opened.insert(config, Arc::clone(&client));
                    client
                }
            };
            clients.insert(name.clone(), client);
        }

        log::info!(
            "Search clients ready: {} environment(s), {} connection(s)",
            clients.len(),
            opened.len()
        );

        Ok(Self {
            clients,
            default_client,
        })
    }

    /// Client configured for an environment.
    pub fn client(&self, environment: &str) -> Result<&Arc<dyn SearchIndex>> {
        self.clients
            .get(environment)
            .ok_or_else(|| AppError::client_resolution(environment))
    }

    /// Client bound to the primary cluster.
    pub fn default_client(&self) -> &Arc<dyn SearchIndex> {
        &self.default_client
    }

    /// Configured environment names.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }
}
