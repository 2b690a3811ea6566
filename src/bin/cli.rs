//! content-sync CLI
//!
//! Runs the webhook/feed server, checks configuration, or dispatches a single
//! notification by hand.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use content_sync::{
    config::{load_config, load_validated},
    error::{AppError, Result},
    models::{Config, Topic},
    server::{self, AppState},
    services::webhook,
};

/// content-sync - CMS webhook synchronization and feeds
#[derive(Parser, Debug)]
#[command(
    name = "content-sync",
    version,
    about = "Keeps content search indexes in sync with CMS webhooks"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/content-sync.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the webhook and feed endpoints
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Dispatch one notification without going through HTTP
    Dispatch {
        /// Topic wire string, e.g. ContentManagement.Entry.publish
        #[arg(long)]
        topic: String,

        /// Target environment (defaults to dev)
        #[arg(long)]
        env: Option<String>,

        /// File holding the notification JSON body
        #[arg(long)]
        body: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("content-sync {} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve { bind } => {
            let mut config = load_validated(&cli.config)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            log::info!(
                "{} sync environment(s), primary search at {}",
                config.sync.indexes.len(),
                config.search.host
            );
            server::serve(&config).await?;
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            let config = load_config(&cli.config);
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            report(&config);

            log::info!("All validations passed!");
        }

        Command::Dispatch { topic, env, body } => {
            let config = load_validated(&cli.config)?;
            if Topic::from_wire(&topic) == Topic::Unknown {
                log::warn!("Topic {} is not recognized, it will be rejected", topic);
            }

            let payload = tokio::fs::read(&body).await?;
            let event = webhook::parse(Some(topic.as_str()), &payload, env.as_deref())?;
            log::info!(
                "Dispatching {} for {} ({}) in {}",
                event.topic,
                event.entry_id,
                event.content_type_id,
                event.environment
            );

            let state = Arc::new(AppState::from_config(&config)?);
            let outcome = state.dispatcher.dispatch(&event).await?;
            log::info!("Outcome: {:?} (status {})", outcome, outcome.status());

            if outcome.status() >= 400 {
                return Err(AppError::validation(format!(
                    "Dispatch answered status {}",
                    outcome.status()
                )));
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

fn report(config: &Config) {
    log::info!("Primary search: {} ({})", config.search.host, config.search.cluster);
    let mut environments: Vec<_> = config.sync.indexes.iter().collect();
    environments.sort_by(|a, b| a.0.cmp(b.0));
    for (name, index) in environments {
        let shared = if *index == config.search { " [primary]" } else { "" };
        log::info!("  {}: {} ({}){}", name, index.host, index.cluster, shared);
    }
    log::info!("Crawl job: {}", config.sync.job_url);
}
