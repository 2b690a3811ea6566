// src/services/dispatcher.rs

//! Routing of parsed notifications to index deletions or recrawls.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{SyncEvent, Topic};
use crate::search::EnvironmentClientRegistry;
use crate::services::trigger::{CrawlTrigger, JobTriggerResult};

/// Status answered for notifications that are not acted on.
pub const REJECTED_STATUS: u16 = 400;

/// What a topic asks the service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Reject,
    Delete,
    Trigger,
}

/// Classify a topic.
pub fn route(topic: Topic) -> SyncAction {
    match topic {
        Topic::EntryUnpublish | Topic::EntryDelete | Topic::AssetUnpublish | Topic::AssetDelete => {
            SyncAction::Delete
        }
        Topic::EntryPublish | Topic::AssetPublish => SyncAction::Trigger,
        Topic::Unknown => SyncAction::Reject,
    }
}

/// Index holding documents of a content type: `"Data Use"` → `"datause"`.
///
/// Whitespace runs are removed, together with a colon directly preceding one.
pub fn index_name(content_type_id: &str) -> String {
    let mut name = String::with_capacity(content_type_id.len());
    let mut chars = content_type_id.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == ':' && chars.peek().is_some_and(|next| next.is_whitespace()) {
            continue;
        }
        name.push(c);
    }
    name.to_lowercase()
}

/// Result of dispatching one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Rejected,
    Deleted { index: String, id: String, status: u16 },
    Triggered(JobTriggerResult),
}

impl SyncOutcome {
    /// HTTP status to answer the notifier with.
    pub fn status(&self) -> u16 {
        match self {
            SyncOutcome::Rejected => REJECTED_STATUS,
            SyncOutcome::Deleted { status, .. } => *status,
            SyncOutcome::Triggered(result) => result.http_status,
        }
    }

    /// `Location` to report, set only for accepted triggers.
    pub fn location(&self) -> Option<&str> {
        match self {
            SyncOutcome::Triggered(result) if result.accepted => result.location_url.as_deref(),
            _ => None,
        }
    }
}

/// Executes the action selected for a notification.
pub struct SyncDispatcher {
    registry: Arc<EnvironmentClientRegistry>,
    trigger: Arc<dyn CrawlTrigger>,
}

impl SyncDispatcher {
    pub fn new(registry: Arc<EnvironmentClientRegistry>, trigger: Arc<dyn CrawlTrigger>) -> Self {
        Self { registry, trigger }
    }

    /// Apply one notification.
    ///
    /// Deletions naming no index or no id are rejected without touching the
    /// search engine. Fails only when a deletion targets an environment with
    /// no search client or the search engine cannot be reached.
    pub async fn dispatch(&self, event: &SyncEvent) -> Result<SyncOutcome> {
        match route(event.topic) {
            SyncAction::Reject => {
                log::warn!(
                    "Unsupported operation {} for {} in {}",
                    event.topic,
                    event.entry_id,
                    event.environment
                );
                Ok(SyncOutcome::Rejected)
            }
            SyncAction::Delete => {
                log::info!("Action received {} for {}", event.topic, event.entry_id);
                let index = index_name(&event.content_type_id);
                if index.is_empty() || event.entry_id.is_empty() {
                    log::warn!(
                        "Cannot delete {:?} from index {:?}: missing index or id",
                        event.entry_id,
                        index
                    );
                    return Ok(SyncOutcome::Rejected);
                }
                let client = self.registry.client(&event.environment)?;
                let outcome = client.delete(&index, &event.entry_id).await?;
                log::info!(
                    "Deleted {}/{} in {} (status {})",
                    index,
                    event.entry_id,
                    event.environment,
                    outcome.status
                );
                Ok(SyncOutcome::Deleted {
                    index,
                    id: event.entry_id.clone(),
                    status: outcome.status,
                })
            }
            SyncAction::Trigger => {
                log::info!(
                    "Action received {}, crawling {}",
                    event.topic,
                    event.environment
                );
                let result = self.trigger.trigger(&event.environment).await;
                Ok(SyncOutcome::Triggered(result))
            }
        }
    }
}
