//! HTTP surface.
//!
//! Assembles the webhook route (behind bearer authentication) and the feed
//! routes (JSON, RSS 2.0 and iCalendar) into a single `Router`.

mod auth;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::models::Config;
use crate::search::{ElasticClient, ElasticClientFactory, EnvironmentClientRegistry, SearchIndex};
use crate::services::{FeedService, JobTrigger, SyncDispatcher};

pub use auth::UNAUTHORIZED_MESSAGE;

/// Path of the webhook endpoint.
pub const SYNC_PATH: &str = "/content/sync";

/// Shared handler state.
pub struct AppState {
    pub dispatcher: SyncDispatcher,
    pub feeds: FeedService,
    /// Bearer token expected on the webhook endpoint
    pub token: String,
}

impl AppState {
    pub fn new(dispatcher: SyncDispatcher, feeds: FeedService, token: impl Into<String>) -> Self {
        Self {
            dispatcher,
            feeds,
            token: token.into(),
        }
    }

    /// Open every search client and the job trigger described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let default_client: Arc<dyn SearchIndex> =
            Arc::new(ElasticClient::new(&config.search, &config.http)?);
        let registry = build_registry(config, Arc::clone(&default_client))?;
        let mut environments: Vec<_> = registry.environments().collect();
        environments.sort_unstable();
        log::info!("Sync environments: {}", environments.join(", "));
        let trigger = JobTrigger::new(config.sync.clone(), &config.http)?;

        Ok(Self::new(
            SyncDispatcher::new(Arc::new(registry), Arc::new(trigger)),
            FeedService::new(default_client, config.feeds.clone())?,
            config.sync.token.clone(),
        ))
    }
}

fn build_registry(
    config: &Config,
    default_client: Arc<dyn SearchIndex>,
) -> Result<EnvironmentClientRegistry> {
    let factory = ElasticClientFactory::new(config.http.clone());
    EnvironmentClientRegistry::build(
        &config.sync.indexes,
        &config.search,
        default_client,
        &factory,
    )
}

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let sync = Router::new()
        .route(SYNC_PATH, post(handlers::sync))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_bearer,
        ));

    let feeds = Router::new()
        .route("/newsroom/news/json", get(handlers::news))
        .route("/newsroom/news/json/{region}", get(handlers::news_by_region))
        .route(
            "/newsroom/news/json/{acronym}/{language}",
            get(handlers::programme_news),
        )
        .route("/newsroom/uses/json", get(handlers::data_uses))
        .route("/newsroom/events/upcoming.json", get(handlers::upcoming_events))
        .route(
            "/newsroom/events/calendar/upcoming.json",
            get(handlers::upcoming_calendar),
        )
        .route("/newsroom/events/{id}", get(handlers::event))
        .route("/newsroom/news/rss", get(handlers::news_rss))
        .route("/newsroom/news/rss/{region}", get(handlers::news_by_region_rss))
        .route(
            "/newsroom/news/rss/{acronym}/{language}",
            get(handlers::programme_news_rss),
        )
        .route("/newsroom/uses/rss", get(handlers::data_uses_rss))
        .route("/newsroom/events/upcoming.xml", get(handlers::upcoming_events_rss))
        .route(
            "/newsroom/events/calendar/upcoming.ics",
            get(handlers::upcoming_calendar_ical),
        )
        .route("/newsroom/events/calendar/{id}", get(handlers::event_ical));

    sync.merge(feeds).with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let listener = TcpListener::bind(&config.server.bind).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
